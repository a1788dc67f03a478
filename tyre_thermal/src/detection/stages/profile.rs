//! Band to column profile.

use arrayvec::ArrayVec;

use crate::frame::{Profile, SENSOR_HEIGHT, SENSOR_WIDTH};
use crate::math::statistics::median_f32_mut;

use super::preprocess::Band;

/// Per-column median across the band, clipped into `[min_temp, max_temp]`.
///
/// A column whose median is not finite pins to `min_temp`.
pub(crate) fn build_profile(band: &Band, min_temp: f32, max_temp: f32) -> Profile {
    let mut profile = [0.0; SENSOR_WIDTH];
    let mut column: ArrayVec<f32, SENSOR_HEIGHT> = ArrayVec::new();

    for (col, value) in profile.iter_mut().enumerate() {
        column.clear();
        column.extend(band.iter().map(|row| row[col]));
        let median = median_f32_mut(&mut column);
        *value = if median.is_finite() {
            median.clamp(min_temp, max_temp)
        } else {
            min_temp
        };
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_band_averages_central_pair() {
        let mut rows = [[0.0; SENSOR_WIDTH]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            row[3] = [10.0, 40.0, 20.0, 30.0][i];
        }
        let band: Band = rows.into_iter().collect();
        let profile = build_profile(&band, 0.0, 180.0);
        assert_eq!(profile[3], 25.0);
        assert_eq!(profile[4], 0.0);
    }

    #[test]
    fn clips_into_sensor_range() {
        let mut row = [50.0; SENSOR_WIDTH];
        row[0] = -30.0;
        row[1] = 170.0;
        let band: Band = [row].into_iter().collect();
        let profile = build_profile(&band, 0.0, 150.0);
        assert_eq!(profile[0], 0.0);
        assert_eq!(profile[1], 150.0);
        assert_eq!(profile[2], 50.0);
    }

    #[test]
    fn non_finite_column_pins_to_min() {
        let mut row = [50.0; SENSOR_WIDTH];
        row[7] = f32::NAN;
        let band: Band = [row].into_iter().collect();
        assert_eq!(build_profile(&band, 5.0, 150.0)[7], 5.0);
    }
}
