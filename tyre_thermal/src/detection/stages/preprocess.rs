//! Region-of-interest band extraction and saturated pixel repair.

use std::ops::Range;

use arrayvec::ArrayVec;

use crate::frame::{ThermalFrame, LAST_COLUMN, SENSOR_HEIGHT, SENSOR_WIDTH};

pub(crate) type BandRow = [f32; SENSOR_WIDTH];

/// The ROI rows of one frame, copied out so repairs never touch the source frame.
pub(crate) type Band = ArrayVec<BandRow, SENSOR_HEIGHT>;

pub(crate) fn extract_band(frame: &ThermalFrame, rows: Range<usize>, band: &mut Band) {
    band.clear();
    for row in rows {
        let mut copy = [0.0; SENSOR_WIDTH];
        copy.copy_from_slice(frame.row(row));
        band.push(copy);
    }
}

/// Replaces every pixel above `threshold` (or NaN) with the median of its row neighbours.
///
/// Scans each row left to right in place, so a repaired pixel is what its right
/// neighbour sees. Returns the number of repaired pixels.
pub(crate) fn repair_saturated(band: &mut Band, threshold: f32) -> usize {
    let mut repaired = 0;
    for row in band.iter_mut() {
        for col in 0..SENSOR_WIDTH {
            if row[col] <= threshold {
                continue;
            }
            row[col] = match col {
                0 => row[1],
                LAST_COLUMN => row[LAST_COLUMN - 1],
                // Median of two is their mean.
                _ => (row[col - 1] + row[col + 1]) * 0.5,
            };
            repaired += 1;
        }
    }
    repaired
}
