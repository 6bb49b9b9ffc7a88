use log::warn;
use serde::Serialize;

use crate::{
    domain::{Preset, PresetId, default_presets},
    schedule::Schedule,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PresetBook {
    presets: Vec<Preset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self {
            presets: default_presets(),
        }
    }
}

impl PresetBook {
    /// Keeps stored presets whose schedules survive a re-walk and drops the
    /// rest.
    pub fn restore(presets: Vec<Preset>) -> Self {
        let presets = presets
            .into_iter()
            .filter_map(|preset| match Schedule::restore(preset.schedule.clone()) {
                Ok(schedule) => Some(Preset {
                    schedule: schedule.to_blocks(),
                    ..preset
                }),
                Err(e) => {
                    warn!("dropping preset {} ({}): {}", preset.id, preset.name, e);
                    None
                }
            })
            .collect();
        Self { presets }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn find(&self, id: &PresetId) -> Option<&Preset> {
        self.presets.iter().find(|preset| &preset.id == id)
    }

    pub fn save(&self, name: &str, schedule: &Schedule) -> PresetBook {
        if name.trim().is_empty() {
            return self.clone();
        }

        let mut presets = self.presets.clone();
        presets.push(Preset {
            id: PresetId::fresh(),
            name: name.to_string(),
            schedule: schedule.to_blocks(),
        });
        PresetBook { presets }
    }

    /// A detached copy of the preset's schedule, ready to become the active
    /// one.
    pub fn load(&self, id: &PresetId) -> Option<Schedule> {
        let preset = self.find(id)?;
        match Schedule::restore(preset.schedule.clone()) {
            Ok(schedule) => Some(schedule),
            Err(e) => {
                warn!("preset {} cannot be loaded: {}", id, e);
                None
            }
        }
    }

    pub fn delete(&self, id: &PresetId) -> PresetBook {
        if id.is_protected() {
            return self.clone();
        }

        let presets = self
            .presets
            .iter()
            .filter(|preset| &preset.id != id)
            .cloned()
            .collect();
        PresetBook { presets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{BlockId, TimeBlock},
        schedule::ScheduleRules,
    };

    #[test]
    fn test_default_book_has_protected_entry() {
        let book = PresetBook::default();
        assert_eq!(book.len(), 1);
        assert!(book.presets()[0].id.is_protected());
    }

    #[test]
    fn test_delete_default_is_refused() {
        let book = PresetBook::default();
        assert_eq!(book.delete(&PresetId::new("default")), book);
    }

    #[test]
    fn test_save_and_delete() {
        let book = PresetBook::default().save("Weekend", &Schedule::default());
        assert_eq!(book.len(), 2);
        let saved = book.presets()[1].clone();
        assert_eq!(saved.name, "Weekend");

        let trimmed = book.delete(&saved.id);
        assert_eq!(trimmed, PresetBook::default());
    }

    #[test]
    fn test_save_ignores_blank_name() {
        let book = PresetBook::default();
        assert_eq!(book.save("  ", &Schedule::default()), book);
    }

    #[test]
    fn test_saved_preset_is_detached_from_active_schedule() {
        let active = Schedule::default();
        let book = PresetBook::default().save("Copy", &active);
        let saved_id = book.presets()[1].id.clone();

        let mut edited_block = active.blocks()[0].clone();
        edited_block.end = 5.0;
        let _edited = active.update_block(&edited_block, &ScheduleRules::default());

        assert_eq!(book.find(&saved_id).unwrap().schedule, active.to_blocks());
    }

    #[test]
    fn test_loaded_schedule_is_independent_copy() {
        let book = PresetBook::default();
        let loaded = book.load(&PresetId::new("default")).unwrap();
        let split = loaded.split_block(&BlockId::new("1"), &ScheduleRules::default());

        assert_ne!(split.len(), loaded.len());
        assert_eq!(book.presets()[0].schedule.len(), loaded.len());
    }

    #[test]
    fn test_load_unknown_is_none() {
        assert!(PresetBook::default().load(&PresetId::new("nope")).is_none());
    }

    #[test]
    fn test_restore_drops_broken_presets() {
        let mut presets = PresetBook::default().presets().to_vec();
        presets.push(Preset {
            id: PresetId::new("broken"),
            name: "Broken".to_string(),
            schedule: Vec::new(),
        });
        presets.push(Preset {
            id: PresetId::new("drifted"),
            name: "Drifted".to_string(),
            schedule: vec![TimeBlock::new("z", "Z", 2.0, 20.0, "#000000")],
        });

        let book = PresetBook::restore(presets);
        assert_eq!(book.len(), 2);
        let drifted = book.find(&PresetId::new("drifted")).unwrap();
        assert_eq!(drifted.schedule[0].start, 0.0);
        assert_eq!(drifted.schedule[0].end, 24.0);
    }

    #[test]
    fn test_preset_round_trip() {
        let book = PresetBook::default().save("Weekend", &Schedule::default());
        let json = serde_json::to_string(&book).unwrap();
        let back: Vec<Preset> = serde_json::from_str(&json).unwrap();
        assert_eq!(PresetBook::restore(back), book);
    }
}
