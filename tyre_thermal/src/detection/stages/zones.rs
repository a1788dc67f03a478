//! Zone split, per-zone statistics, lateral gradient and confidence.

use arrayvec::ArrayVec;

use crate::detection::{Span, ZoneStats};
use crate::frame::{Profile, SENSOR_PIXELS};
use crate::math::statistics::{mad_f32_with_scratch, mean_f32, median_of, min_max, population_std};

use super::preprocess::Band;

/// Splits `span` into left, centre and right zones of `width / 3` outer columns.
///
/// A zone whose end would precede its start collapses onto its start column (left and
/// centre) or its end column (right).
pub(crate) fn split_zones(span: Span) -> [Span; 3] {
    let left = span.left as isize;
    let right = span.right as isize;
    let third = (span.width() / 3) as isize;

    let left_start = left;
    let left_end = (left + third - 1).max(left_start);

    let centre_start = left + third;
    let centre_end = (right - third).max(centre_start);

    let right_end = right;
    let right_start = (right - third + 1).min(right_end);

    [
        Span::new(left_start as usize, left_end as usize),
        Span::new(centre_start as usize, centre_end as usize),
        Span::new(right_start as usize, right_end as usize),
    ]
}

/// Statistics over every band pixel in the zone's columns; all zero when empty.
pub(crate) fn zone_stats(band: &Band, zone: Span) -> ZoneStats {
    let mut values: ArrayVec<f32, SENSOR_PIXELS> = ArrayVec::new();
    for row in band {
        values.extend(row[zone.columns()].iter().copied());
    }

    let Some((min, max)) = min_max(&values) else {
        return ZoneStats::default();
    };

    let avg = mean_f32(&values);
    let median = median_of::<SENSOR_PIXELS>(&values);
    let mad = mad_f32_with_scratch::<SENSOR_PIXELS>(&values, median);

    ZoneStats {
        avg,
        median,
        mad,
        min,
        max,
        range: max - min,
        std: population_std(&values, avg),
        count: values.len(),
    }
}

/// Max minus min of the filtered profile over the span.
pub(crate) fn lateral_gradient(profile: &Profile, span: Span) -> f32 {
    min_max(&profile[span.columns()]).map_or(0.0, |(lo, hi)| hi - lo)
}

/// Degrees of lateral gradient that earn a full gradient score.
const FULL_GRADIENT_SCORE: f32 = 10.0;

pub(crate) fn confidence(width: usize, gradient: f32, min_width: usize, max_width: usize) -> f32 {
    let width_score = if (min_width..=max_width).contains(&width) {
        1.0
    } else {
        0.5
    };
    let gradient_score = (gradient / FULL_GRADIENT_SCORE).clamp(0.0, 1.0);
    (width_score + gradient_score) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SENSOR_WIDTH;

    #[test]
    fn splits_evenly_divisible_span() {
        let [l, c, r] = split_zones(Span::new(10, 21));
        assert_eq!(l, Span::new(10, 13));
        assert_eq!(c, Span::new(14, 17));
        assert_eq!(r, Span::new(18, 21));
    }

    #[test]
    fn remainder_goes_to_centre() {
        let [l, c, r] = split_zones(Span::new(12, 20));
        assert_eq!(l, Span::new(12, 14));
        assert_eq!(c, Span::new(15, 17));
        assert_eq!(r, Span::new(18, 20));

        let [l, c, r] = split_zones(Span::new(0, 10));
        assert_eq!(l, Span::new(0, 2));
        assert_eq!(c, Span::new(3, 7));
        assert_eq!(r, Span::new(8, 10));
    }

    #[test]
    fn narrow_spans_collapse_zones() {
        let [l, c, r] = split_zones(Span::new(5, 6));
        assert_eq!(l, Span::new(5, 5));
        assert_eq!(c, Span::new(5, 6));
        assert_eq!(r, Span::new(6, 6));

        let [l, c, r] = split_zones(Span::new(31, 31));
        assert_eq!([l, c, r], [Span::new(31, 31); 3]);
    }

    #[test]
    fn zone_stats_over_band_pixels() {
        let mut rows = [[20.0; SENSOR_WIDTH]; 2];
        rows[0][4] = 30.0;
        rows[1][4] = 40.0;
        rows[0][5] = 50.0;
        rows[1][5] = 60.0;
        let band: Band = rows.into_iter().collect();

        let stats = zone_stats(&band, Span::new(4, 5));
        assert_eq!(stats.count, 4);
        assert_eq!(stats.avg, 45.0);
        assert_eq!(stats.median, 45.0);
        assert_eq!(stats.min, 30.0);
        assert_eq!(stats.max, 60.0);
        assert_eq!(stats.range, 30.0);
        // deviations 15, 5, 5, 15 -> median 10
        assert!((stats.mad - 14.826).abs() < 1e-3);
        assert!((stats.std - 125.0f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn empty_band_yields_zero_stats() {
        let band = Band::new();
        assert_eq!(zone_stats(&band, Span::new(0, 3)), ZoneStats::default());
    }

    #[test]
    fn gradient_over_span_only() {
        let mut profile = [25.0; SENSOR_WIDTH];
        profile[0] = 90.0;
        profile[10] = 40.0;
        profile[12] = 33.0;
        assert_eq!(lateral_gradient(&profile, Span::new(10, 14)), 15.0);
    }

    #[test]
    fn confidence_combines_width_and_gradient() {
        assert_eq!(confidence(9, 20.0, 6, 28), 1.0);
        assert_eq!(confidence(9, 5.0, 6, 28), 0.75);
        assert_eq!(confidence(30, 0.0, 6, 28), 0.25);
    }
}
