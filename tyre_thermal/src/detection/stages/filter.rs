//! Spatial 3-tap median and temporal EMA over the column profile.

use crate::frame::{Profile, LAST_COLUMN, SENSOR_WIDTH};

#[inline]
fn median3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).max(a.max(b).min(c))
}

/// 3-tap median; each edge column uses the mean of itself and its neighbour.
pub(crate) fn median_filter_3(input: &Profile) -> Profile {
    let mut out = [0.0; SENSOR_WIDTH];
    out[0] = (input[0] + input[1]) * 0.5;
    out[LAST_COLUMN] = (input[LAST_COLUMN - 1] + input[LAST_COLUMN]) * 0.5;
    for col in 1..LAST_COLUMN {
        out[col] = median3(input[col - 1], input[col], input[col + 1]);
    }
    out
}

/// `out = α·input + (1 − α)·prev`; the first call copies `input`. The output becomes `prev`.
pub(crate) fn apply_ema(input: &Profile, prev: &mut Option<Profile>, alpha: f32) -> Profile {
    let out = match prev {
        None => *input,
        Some(prev) => {
            let mut out = [0.0; SENSOR_WIDTH];
            for ((o, &i), &p) in out.iter_mut().zip(input).zip(prev.iter()) {
                *o = alpha * i + (1.0 - alpha) * p;
            }
            out
        }
    };
    *prev = Some(out);
    out
}
