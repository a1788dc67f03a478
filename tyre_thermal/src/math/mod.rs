//! Small numeric helpers shared by the detection stages.

pub mod statistics;

/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
pub const MAD_TO_SIGMA: f32 = 1.4826;

/// Convert MAD to standard deviation (assuming normal distribution).
#[inline]
pub fn mad_to_sigma(mad: f32) -> f32 {
    mad * MAD_TO_SIGMA
}

/// Converts °C to the signed tenths-of-degree wire format.
///
/// Truncates toward zero and saturates at the `i16` range; non-finite input maps to 0.
#[inline]
pub fn to_tenths(celsius: f32) -> i16 {
    if !celsius.is_finite() {
        return 0;
    }
    // `as` saturates for out-of-range floats.
    (celsius * 10.0) as i16
}
