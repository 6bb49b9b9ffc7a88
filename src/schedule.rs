use log::debug;
use serde::Serialize;

use crate::{
    constants::SCHEDULE_SETTINGS,
    domain::{BlockId, TimeBlock, initial_blocks},
};

mod normalize;

pub use normalize::InvariantViolation;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleRules {
    pub min_slice_hours: f64,
    pub min_split_hours: f64,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            min_slice_hours: SCHEDULE_SETTINGS.min_slice_hours,
            min_split_hours: SCHEDULE_SETTINGS.min_split_hours,
        }
    }
}

/// The active day: contiguous blocks covering `[0, 24)` in start order.
///
/// Every operation returns a new `Schedule` and leaves `self` untouched.
/// Unknown ids and refused edits return an unchanged copy.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    blocks: Vec<TimeBlock>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            blocks: initial_blocks(),
        }
    }
}

impl Schedule {
    /// Builds a schedule from stored blocks, re-walking them first. Lists that
    /// are still broken after the walk are rejected.
    pub fn restore(mut blocks: Vec<TimeBlock>) -> Result<Self, InvariantViolation> {
        normalize::normalize(&mut blocks, SCHEDULE_SETTINGS.day_hours);
        let schedule = Self { blocks };
        schedule.check()?;
        Ok(schedule)
    }

    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    pub fn to_blocks(&self) -> Vec<TimeBlock> {
        self.blocks.clone()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn find(&self, id: &BlockId) -> Option<&TimeBlock> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn check(&self) -> Result<(), InvariantViolation> {
        normalize::check(&self.blocks, SCHEDULE_SETTINGS.day_hours)
    }

    pub fn update_block(&self, proposed: &TimeBlock, rules: &ScheduleRules) -> Schedule {
        let Some(idx) = self.index_of(&proposed.id) else {
            return self.clone();
        };

        let mut blocks = self.blocks.clone();
        blocks[idx].name = proposed.name.clone();
        blocks[idx].color = proposed.color.clone();

        if self.blocks[idx].same_span(proposed) {
            return Schedule { blocks };
        }

        let last = blocks.len() - 1;
        if idx == last {
            blocks[idx].end = SCHEDULE_SETTINGS.day_hours;
            blocks[idx].start = if idx == 0 { 0.0 } else { blocks[idx - 1].end };
        } else if let Some(end) = clamp_end(&blocks, idx, proposed.end, rules) {
            debug!("moving end of block {} to {}", proposed.id, end);
            blocks[idx].end = end;
            blocks[idx + 1].start = end;
        }

        normalize::normalize(&mut blocks, SCHEDULE_SETTINGS.day_hours);
        Schedule { blocks }
    }

    pub fn split_block(&self, id: &BlockId, rules: &ScheduleRules) -> Schedule {
        let Some(idx) = self.index_of(id) else {
            return self.clone();
        };

        let original = &self.blocks[idx];
        let duration = original.duration();
        if duration < rules.min_split_hours {
            return self.clone();
        }

        let mid = original.start + duration / 2.0;
        let upper = TimeBlock {
            id: BlockId::fresh(),
            start: mid,
            ..original.clone()
        };
        debug!("splitting block {} at {} into {}", id, mid, upper.id);

        let mut blocks = self.blocks.clone();
        blocks[idx].end = mid;
        blocks.insert(idx + 1, upper);
        Schedule { blocks }
    }

    pub fn can_delete(&self) -> bool {
        self.blocks.len() > 1
    }

    pub fn delete_block(&self, id: &BlockId) -> Schedule {
        if !self.can_delete() {
            return self.clone();
        }
        let Some(idx) = self.index_of(id) else {
            return self.clone();
        };

        let mut blocks = self.blocks.clone();
        let removed = blocks.remove(idx);
        if idx > 0 {
            blocks[idx - 1].end += removed.duration();
        } else {
            blocks[0].start = 0.0;
        }
        debug!("deleted block {} ({}h released)", id, removed.duration());

        normalize::normalize(&mut blocks, SCHEDULE_SETTINGS.day_hours);
        Schedule { blocks }
    }

    pub fn total_hours(&self) -> f64 {
        self.blocks.iter().map(TimeBlock::duration).sum()
    }
}

/// The edited end stays at least one slice past its own start and leaves at
/// least one slice for the following block. `None` when no such end exists.
fn clamp_end(
    blocks: &[TimeBlock],
    idx: usize,
    proposed_end: f64,
    rules: &ScheduleRules,
) -> Option<f64> {
    if !proposed_end.is_finite() {
        return None;
    }

    let lower = blocks[idx].start + rules.min_slice_hours;
    let upper = (blocks[idx + 1].end - rules.min_slice_hours).min(SCHEDULE_SETTINGS.day_hours);
    if lower > upper {
        return None;
    }

    Some(proposed_end.clamp(lower, upper))
}
