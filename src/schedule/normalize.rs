use std::collections::HashSet;

use itertools::Itertools;
use thiserror::Error;

use crate::domain::TimeBlock;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("schedule has no blocks")]
    Empty,
    #[error("first block starts at {0} instead of 0")]
    FirstStart(f64),
    #[error("last block ends at {0} instead of the end of the day")]
    LastEnd(f64),
    #[error("block {index} does not start where its predecessor ends")]
    Gap { index: usize },
    #[error("block {index} has no positive width")]
    Degenerate { index: usize },
    #[error("block id {0} appears more than once")]
    DuplicateId(String),
}

/// Re-walks the list so every block starts where its predecessor ends, the
/// first block starts at 0 and the last one closes the day.
pub(super) fn normalize(blocks: &mut [TimeBlock], day_hours: f64) {
    blocks.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut cursor = 0.0;
    for block in blocks.iter_mut() {
        block.start = cursor;
        cursor = block.end;
    }

    if let Some(last) = blocks.last_mut() {
        last.end = day_hours;
    }
}

pub(super) fn check(blocks: &[TimeBlock], day_hours: f64) -> Result<(), InvariantViolation> {
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        return Err(InvariantViolation::Empty);
    };

    if first.start != 0.0 {
        return Err(InvariantViolation::FirstStart(first.start));
    }
    if last.end != day_hours {
        return Err(InvariantViolation::LastEnd(last.end));
    }

    for (index, (prev, next)) in blocks.iter().tuple_windows().enumerate() {
        if prev.end != next.start {
            return Err(InvariantViolation::Gap { index: index + 1 });
        }
    }

    if let Some(index) = blocks
        .iter()
        .position(|block| !block.end.is_finite() || block.start.is_nan() || block.start >= block.end)
    {
        return Err(InvariantViolation::Degenerate { index });
    }

    let mut seen = HashSet::with_capacity(blocks.len());
    if let Some(duplicate) = blocks.iter().find(|block| !seen.insert(&block.id)) {
        return Err(InvariantViolation::DuplicateId(duplicate.id.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{InvariantViolation, check, normalize};
    use crate::domain::TimeBlock;

    fn block(id: &str, start: f64, end: f64) -> TimeBlock {
        TimeBlock::new(id, id, start, end, "#000000")
    }

    #[test]
    fn test_normalize_closes_gaps_and_overlaps() {
        let mut blocks = vec![
            block("a", 0.5, 6.0),
            block("b", 7.0, 12.0),
            block("c", 11.0, 20.0),
        ];
        normalize(&mut blocks, 24.0);

        assert_eq!(blocks[0].start, 0.0);
        assert_eq!(blocks[1].start, 6.0);
        assert_eq!(blocks[2].start, 12.0);
        assert_eq!(blocks[2].end, 24.0);
        assert!(check(&blocks, 24.0).is_ok());
    }

    #[test]
    fn test_normalize_sorts_by_start() {
        let mut blocks = vec![block("late", 12.0, 24.0), block("early", 0.0, 12.0)];
        normalize(&mut blocks, 24.0);
        assert_eq!(blocks[0].id.as_str(), "early");
        assert_eq!(blocks[1].id.as_str(), "late");
    }

    #[test]
    fn test_check_reports_violations() {
        assert_eq!(check(&[], 24.0), Err(InvariantViolation::Empty));
        assert_eq!(
            check(&[block("a", 1.0, 24.0)], 24.0),
            Err(InvariantViolation::FirstStart(1.0))
        );
        assert_eq!(
            check(&[block("a", 0.0, 23.0)], 24.0),
            Err(InvariantViolation::LastEnd(23.0))
        );
        assert_eq!(
            check(&[block("a", 0.0, 10.0), block("b", 11.0, 24.0)], 24.0),
            Err(InvariantViolation::Gap { index: 1 })
        );
    }

    #[test]
    fn test_check_rejects_duplicate_ids() {
        let blocks = vec![block("a", 0.0, 12.0), block("a", 12.0, 24.0)];
        assert_eq!(
            check(&blocks, 24.0),
            Err(InvariantViolation::DuplicateId("a".to_string()))
        );
    }

    #[test]
    fn test_check_rejects_zero_width_after_walk() {
        // b ends before a does, so the walk leaves it inverted
        let mut blocks = vec![block("a", 0.0, 10.0), block("b", 5.0, 8.0), block("c", 8.0, 24.0)];
        normalize(&mut blocks, 24.0);
        assert_eq!(
            check(&blocks, 24.0),
            Err(InvariantViolation::Degenerate { index: 1 })
        );
    }
}
