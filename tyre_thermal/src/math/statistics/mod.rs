//! Statistical functions: median, MAD, mean, population standard deviation.
//!
//! Everything here works on caller-provided slices and fixed-capacity scratch
//! buffers so the per-cycle path never touches the heap.

use arrayvec::ArrayVec;

use super::mad_to_sigma;

/// Compute absolute deviations from median in-place.
///
/// Replaces each value with |value - median|.
#[inline]
fn abs_deviation_inplace(values: &mut [f32], median: f32) {
    for v in values.iter_mut() {
        *v = (*v - median).abs();
    }
}

/// Calculate the median of f32 values in-place.
///
/// Mutates the input buffer (partial sort via quickselect). An even count averages
/// the two central order statistics. Returns 0.0 for an empty slice.
#[inline]
pub fn median_f32_mut(data: &mut [f32]) -> f32 {
    let len = data.len();
    if len == 0 {
        return 0.0;
    }
    let mid = len / 2;

    let (left_part, median, _) = data.select_nth_unstable_by(mid, f32::total_cmp);
    let right = *median;
    if len & 1 == 1 {
        right
    } else {
        let left = left_part
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        (left + right) * 0.5
    }
}

/// Median of a read-only slice, using an `N`-capacity stack scratch buffer.
///
/// Values beyond the first `N` are ignored.
#[inline]
pub fn median_of<const N: usize>(values: &[f32]) -> f32 {
    debug_assert!(values.len() <= N);
    let mut scratch: ArrayVec<f32, N> = values.iter().copied().take(N).collect();
    median_f32_mut(&mut scratch)
}

/// Scaled MAD (σ-equivalent) around a known median.
///
/// `MAD = 1.4826 × median(|x_i - median|)`; 0.0 for an empty slice.
#[inline]
pub fn mad_f32_with_scratch<const N: usize>(values: &[f32], median: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    debug_assert!(values.len() <= N);
    let mut scratch: ArrayVec<f32, N> = values
        .iter()
        .take(N)
        .map(|&v| (v - median).abs())
        .collect();
    mad_to_sigma(median_f32_mut(&mut scratch))
}

/// Compute median and scaled MAD together.
///
/// More efficient than computing separately since median is needed for MAD.
pub fn median_and_mad<const N: usize>(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    debug_assert!(values.len() <= N);
    let mut scratch: ArrayVec<f32, N> = values.iter().copied().take(N).collect();

    let median = median_f32_mut(&mut scratch);
    abs_deviation_inplace(&mut scratch, median);
    let mad = median_f32_mut(&mut scratch);

    (median, mad_to_sigma(mad))
}

/// Arithmetic mean; 0.0 for an empty slice.
#[inline]
pub fn mean_f32(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation around a known mean; 0.0 for an empty slice.
#[inline]
pub fn population_std(values: &[f32], mean: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum::<f32>()
        / values.len() as f32;
    variance.sqrt()
}

/// Minimum and maximum, or `None` for an empty slice.
#[inline]
pub fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .skip(1)
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}
