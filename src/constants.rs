pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const DEFAULT_PRESET_ID: &str = "default";

pub const SCHEDULE_SETTINGS: ScheduleSettings = ScheduleSettings {
    day_hours: 24.0,
    min_slice_hours: 0.5,
    min_split_hours: 1.0,
    nudge_hours: 0.25,
};

pub const STORE_KEYS: StoreKeys = StoreKeys {
    schedule: "schedule",
    todos: "todos",
    presets: "presets",
};

pub const TIME_SETTINGS: TimeSettings = TimeSettings {
    poll_ms: 50,
    target_fps: 24,
};

pub const RING_SETTINGS: RingSettings = RingSettings {
    inner_radius: 0.4,
    outer_radius: 0.8,
    selected_outer_radius: 0.92,
    radial_steps: 14,
    angular_step_hours: 0.02,
    label_min_fraction: 0.05,
};

pub const LOG_SETTINGS: LogSettings = LogSettings {
    file_basename: "daypie",
    max_file_bytes: 1024 * 1024,
    max_files: 3,
};

pub struct ScheduleSettings {
    pub day_hours: f64,
    pub min_slice_hours: f64,
    pub min_split_hours: f64,
    pub nudge_hours: f64,
}

pub struct StoreKeys {
    pub schedule: &'static str,
    pub todos: &'static str,
    pub presets: &'static str,
}

pub struct TimeSettings {
    pub poll_ms: u64,
    pub target_fps: u64,
}

pub struct RingSettings {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub selected_outer_radius: f64,
    pub radial_steps: usize,
    pub angular_step_hours: f64,
    pub label_min_fraction: f64,
}

pub struct LogSettings {
    pub file_basename: &'static str,
    pub max_file_bytes: u64,
    pub max_files: usize,
}
