use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    constants::SCHEDULE_SETTINGS,
    schedule::ScheduleRules,
    storage,
};

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_slice_hours() -> f64 {
    SCHEDULE_SETTINGS.min_slice_hours
}

fn default_min_split_hours() -> f64 {
    SCHEDULE_SETTINGS.min_split_hours
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_min_slice_hours")]
    pub min_slice_hours: f64,
    #[serde(default = "default_min_split_hours")]
    pub min_split_hours: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
            min_slice_hours: default_min_slice_hours(),
            min_split_hours: default_min_split_hours(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        match storage::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// A missing file means defaults; a malformed one is reported and ignored.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| toml::from_str::<Config>(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => config.sanitized(),
            Err(e) => {
                eprintln!("Warning: ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Both minimums must fit inside the day, and a split must leave two
    /// slices of at least the minimum width.
    pub fn sanitized(mut self) -> Self {
        let day = SCHEDULE_SETTINGS.day_hours;
        let in_day = |value: f64| value.is_finite() && value > 0.0 && value < day;

        if !in_day(self.min_slice_hours) || self.min_slice_hours * 2.0 >= day {
            eprintln!(
                "Warning: min_slice_hours {} out of range, using {}",
                self.min_slice_hours,
                default_min_slice_hours()
            );
            self.min_slice_hours = default_min_slice_hours();
        }
        if !in_day(self.min_split_hours) {
            eprintln!(
                "Warning: min_split_hours {} out of range, using {}",
                self.min_split_hours,
                default_min_split_hours()
            );
            self.min_split_hours = default_min_split_hours();
        }
        if self.min_split_hours < self.min_slice_hours * 2.0 {
            self.min_split_hours = self.min_slice_hours * 2.0;
        }

        self
    }

    pub fn schedule_rules(&self) -> ScheduleRules {
        ScheduleRules {
            min_slice_hours: self.min_slice_hours,
            min_split_hours: self.min_split_hours,
        }
    }
}
