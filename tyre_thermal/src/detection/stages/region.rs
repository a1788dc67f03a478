//! Dual-criterion region growing from the seed column.
//!
//! A column joins the span if it is within `k` of the seed temperature, or if it is
//! beyond the global margin `delta` on the tyre's side of the global median.

use crate::config::DetectionConfig;
use crate::detection::Span;
use crate::frame::{Profile, LAST_COLUMN};
use crate::math::statistics::median_and_mad;

use super::uniformity::GlobalStats;

/// Half-width of the window used for the seed's local spread.
const LOCAL_RADIUS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Growth {
    pub span: Span,
    pub inverted: bool,
    pub centre_temp: f32,
    pub delta: f32,
    pub k: f32,
}

pub(crate) fn grow_region(profile: &Profile, global: &GlobalStats, config: &DetectionConfig) -> Growth {
    let seed = config.seed_column.min(LAST_COLUMN);
    let centre_temp = profile[seed];

    let delta = config
        .delta_floor
        .max(config.delta_multiplier * global.mad);
    let inverted = centre_temp < global.median - delta;

    let lo = seed.saturating_sub(LOCAL_RADIUS);
    let hi = (seed + LOCAL_RADIUS).min(LAST_COLUMN);
    let (_, local_mad) = median_and_mad::<{ 2 * LOCAL_RADIUS + 1 }>(&profile[lo..=hi]);
    let k = config.k_floor.max(config.k_multiplier * local_mad);

    let admit = |t: f32| {
        if (t - centre_temp).abs() <= k {
            return true;
        }
        if inverted {
            t <= global.median - delta
        } else {
            t >= global.median + delta
        }
    };

    let admit_column = |col: usize| admit(profile[col]);
    let left = grow_side((0..seed).rev(), seed, config.max_fail_count, admit_column);
    let right = grow_side(seed + 1..=LAST_COLUMN, seed, config.max_fail_count, admit_column);

    tracing::debug!(
        left,
        right,
        centre_temp,
        delta,
        k,
        inverted,
        "region grown"
    );

    Growth {
        span: Span::new(left, right),
        inverted,
        centre_temp,
        delta,
        k,
    }
}

/// Walks `columns` outward, returning the last admitted column (the seed if none).
fn grow_side(
    columns: impl Iterator<Item = usize>,
    seed: usize,
    max_fail_count: usize,
    admit: impl Fn(usize) -> bool,
) -> usize {
    let mut bound = seed;
    let mut fails = 0;
    for col in columns {
        if admit(col) {
            bound = col;
            fails = 0;
        } else {
            fails += 1;
            if fails > max_fail_count {
                break;
            }
        }
    }
    bound
}
