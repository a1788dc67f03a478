pub trait FloatExt {
    /// Equality within an explicit absolute tolerance.
    fn within(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f32 {
    fn within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance
    }
}

impl FloatExt for f64 {
    fn within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_never_within() {
        assert!(!f32::NAN.within(0.0, 1.0));
        assert!(!f64::NAN.within(f64::NAN, f64::INFINITY));
    }

    #[test]
    fn within_tolerance_is_inclusive() {
        assert!(25.0_f32.within(25.5, 0.5));
        assert!(!25.0_f32.within(25.6, 0.5));
        assert!((-3.0_f32).within(-2.9, 0.11));
        assert!(0.3_f64.within(0.1 + 0.2, 1e-12));
    }
}
