//! Small numeric helpers.

/// Evenly spaced values from `start` to `end` inclusive.
///
/// Values are computed as `start + i * step` rather than accumulated so
/// that `range(-5.0, 5.0, 2.5)` lands exactly on `5.0`. A non-positive
/// step or `end < start` yields an empty vector.
pub fn range(start: f32, end: f32, step: f32) -> Vec<f32> {
    if step <= 0.0 || end < start {
        return Vec::new();
    }
    let count = ((end - start) / step + 1e-4).floor() as usize + 1;
    (0..count).map(|i| start + i as f32 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_inclusive() {
        assert_eq!(range(-5.0, 5.0, 2.5), vec![-5.0, -2.5, 0.0, 2.5, 5.0]);
        assert_eq!(range(0.0, 1.0, 0.3).len(), 4);
        assert_eq!(range(0.0, 0.0, 1.0), vec![0.0]);
    }

    #[test]
    fn test_range_degenerate() {
        assert!(range(0.0, 1.0, 0.0).is_empty());
        assert!(range(1.0, 0.0, 0.5).is_empty());
    }
}
