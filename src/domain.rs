use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_PRESET_ID, PALETTE};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn fresh() -> Self {
                $name(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(BlockId);
string_id!(TodoId);
string_id!(PresetId);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        BlockId(id.into())
    }
}

// Todos only ever get fresh ids outside of tests.
#[cfg(test)]
impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        TodoId(id.into())
    }
}

impl PresetId {
    pub fn new(id: impl Into<String>) -> Self {
        PresetId(id.into())
    }

    pub fn is_protected(&self) -> bool {
        self.0 == DEFAULT_PRESET_ID
    }
}

/// A named, coloured slice of the day. `start` and `end` are hours in `[0, 24]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: BlockId,
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub color: String,
}

impl TimeBlock {
    pub fn new(id: &str, name: &str, start: f64, end: f64, color: &str) -> Self {
        Self {
            id: BlockId::new(id),
            name: name.to_string(),
            start,
            end,
            color: color.to_string(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn same_span(&self, other: &TimeBlock) -> bool {
        self.start == other.start && self.end == other.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub schedule: Vec<TimeBlock>,
}

pub fn initial_blocks() -> Vec<TimeBlock> {
    vec![
        TimeBlock::new("1", "Sleep", 0.0, 7.0, PALETTE[0]),
        TimeBlock::new("2", "Prep & commute", 7.0, 9.0, PALETTE[1]),
        TimeBlock::new("3", "Work", 9.0, 12.0, PALETTE[2]),
        TimeBlock::new("4", "Lunch", 12.0, 13.0, PALETTE[3]),
        TimeBlock::new("5", "Work", 13.0, 18.0, PALETTE[4]),
        TimeBlock::new("6", "Dinner & relax", 18.0, 21.0, PALETTE[5]),
        TimeBlock::new("7", "Hobby & study", 21.0, 23.0, PALETTE[6]),
        TimeBlock::new("8", "Wind down", 23.0, 24.0, PALETTE[7]),
    ]
}

pub fn default_presets() -> Vec<Preset> {
    vec![Preset {
        id: PresetId::new(DEFAULT_PRESET_ID),
        name: "Default".to_string(),
        schedule: initial_blocks(),
    }]
}

/// Returns `#rrggbb` colours unchanged and rejects anything else.
pub fn normalize_hex_color(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#')?;
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", digits.to_ascii_lowercase()))
    } else {
        None
    }
}

pub fn next_palette_color(current: &str) -> &'static str {
    let pos = PALETTE
        .iter()
        .position(|color| color.eq_ignore_ascii_case(current));
    match pos {
        Some(idx) => PALETTE[(idx + 1) % PALETTE.len()],
        None => PALETTE[0],
    }
}
