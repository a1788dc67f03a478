//! Global robust statistics and the no-tyre gate.

use crate::frame::{Profile, LAST_COLUMN, SENSOR_WIDTH};
use crate::math::statistics::median_and_mad;

use crate::detection::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GlobalStats {
    pub median: f32,
    /// σ-scaled MAD.
    pub mad: f32,
}

pub(crate) fn global_stats(profile: &Profile) -> GlobalStats {
    let (median, mad) = median_and_mad::<SENSOR_WIDTH>(profile);
    GlobalStats { median, mad }
}

#[inline]
pub(crate) fn is_uniform(stats: &GlobalStats, mad_uniform_threshold: f32) -> bool {
    stats.mad < mad_uniform_threshold
}

/// Zones reported when there is no tyre: the sensor width split in thirds.
pub(crate) fn fallback_zones() -> [Span; 3] {
    const THIRD: usize = SENSOR_WIDTH / 3;
    [
        Span::new(0, THIRD - 1),
        Span::new(THIRD, 2 * THIRD - 1),
        Span::new(2 * THIRD, LAST_COLUMN),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_profile_is_uniform() {
        let stats = global_stats(&[25.0; SENSOR_WIDTH]);
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.mad, 0.0);
        assert!(is_uniform(&stats, 0.5));
    }

    #[test]
    fn structured_profile_is_not_uniform() {
        let profile: Profile = std::array::from_fn(|col| if col % 2 == 0 { 20.0 } else { 30.0 });
        let stats = global_stats(&profile);
        assert!(!is_uniform(&stats, 0.5));
    }

    #[test]
    fn fallback_thirds_cover_the_sensor() {
        let [left, centre, right] = fallback_zones();
        assert_eq!((left.left, left.right), (0, 9));
        assert_eq!((centre.left, centre.right), (10, 19));
        assert_eq!((right.left, right.right), (20, 31));
    }
}
