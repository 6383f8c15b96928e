//! Window arithmetic for the backward sweep.

use std::ops::Range;

/// Half-open id range of the window at `offset` below `upper` (inclusive),
/// or `None` once history below the bound is exhausted.
///
/// `start = max(1, upper - offset - size + 1)`, `end = upper - offset + 1`.
pub fn window_at(upper: i64, offset: u64, size: u32) -> Option<Range<i64>> {
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let end = upper.saturating_sub(offset).saturating_add(1);
    let start = end.saturating_sub(i64::from(size)).max(1);
    (start < end).then_some(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_from_250() {
        assert_eq!(window_at(250, 0, 100), Some(151..251));
        assert_eq!(window_at(250, 100, 100), Some(51..151));
        assert_eq!(window_at(250, 200, 100), Some(1..51));
        assert_eq!(window_at(250, 300, 100), None);
    }

    #[test]
    fn test_small_history() {
        assert_eq!(window_at(1, 0, 100), Some(1..2));
        assert_eq!(window_at(0, 0, 100), None);
    }

    #[test]
    fn test_offset_beyond_bound() {
        assert_eq!(window_at(250, 250, 100), None);
        assert_eq!(window_at(250, u64::MAX, 100), None);
    }
}
