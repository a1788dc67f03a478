//! Everything one publish writes, assembled outside the engine lock.

use std::ops::Range;

use crate::detection::FrameResult;
use crate::frame::{ThermalFrame, SENSOR_PIXELS};
use crate::math::to_tenths;

use super::{reg, FIRMWARE_VERSION, RAW_CHANNEL_COUNT};

/// First address the publish step owns.
pub(crate) const PUBLISHED_START: u8 = reg::FIRMWARE_VERSION;
/// One past the last published register; the stream window starts here.
pub(crate) const PUBLISHED_END: u8 = reg::FRAME_STREAM;
const PUBLISHED_LEN: usize = (PUBLISHED_END - PUBLISHED_START) as usize;

/// Every pixel as i16 LE tenths.
pub const FRAME_STREAM_LEN: usize = SENSOR_PIXELS * 2;

/// Columns averaged into one raw channel.
const RAW_CHANNEL_COLUMNS: usize = 2;

/// Status, temperature and raw-channel registers plus the frame stream of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    registers: [u8; PUBLISHED_LEN],
    pub(crate) stream: [u8; FRAME_STREAM_LEN],
}

impl RegisterSnapshot {
    /// Encodes one cycle.
    ///
    /// With `fallback_mode` set and no tyre detected, the centre zone is reported for
    /// all three zones and the gradient is zero. The raw channels average column pairs
    /// over `roi_rows` and are zero unless `raw_mode` is set.
    pub fn build(
        result: &FrameResult,
        frame: &ThermalFrame,
        fps: f32,
        fallback_mode: bool,
        raw_mode: bool,
        roi_rows: Range<usize>,
    ) -> Self {
        let mut snapshot = Self {
            registers: [0; PUBLISHED_LEN],
            stream: [0; FRAME_STREAM_LEN],
        };
        let detection = &result.detection;

        snapshot.set(reg::FIRMWARE_VERSION, FIRMWARE_VERSION);
        let [frame_lo, frame_hi] = (result.frame_number as u16).to_le_bytes();
        snapshot.set(reg::FRAME_NUMBER_L, frame_lo);
        snapshot.set(reg::FRAME_NUMBER_H, frame_hi);
        snapshot.set(reg::FPS, if fps.is_finite() { fps as u8 } else { 0 });
        snapshot.set(reg::DETECTED, detection.detected as u8);
        snapshot.set(reg::CONFIDENCE, (detection.confidence * 100.0) as u8);
        snapshot.set(reg::TYRE_WIDTH, detection.width as u8);
        snapshot.set(reg::SPAN_START, detection.span.left as u8);
        snapshot.set(reg::SPAN_END, detection.span.right as u8);
        snapshot.set(reg::WARNINGS, result.warnings.bits());
        snapshot.set(reg::POLARITY, (detection.detected && detection.inverted) as u8);

        let mut left_median = to_tenths(result.left.median);
        let centre_median = to_tenths(result.centre.median);
        let mut right_median = to_tenths(result.right.median);
        let mut left_avg = to_tenths(result.left.avg);
        let centre_avg = to_tenths(result.centre.avg);
        let mut right_avg = to_tenths(result.right.avg);
        let mut gradient = to_tenths(result.lateral_gradient);

        if fallback_mode && !detection.detected {
            left_median = centre_median;
            right_median = centre_median;
            left_avg = centre_avg;
            right_avg = centre_avg;
            gradient = 0;
        }

        snapshot.set_i16(reg::LEFT_MEDIAN, left_median);
        snapshot.set_i16(reg::CENTRE_MEDIAN, centre_median);
        snapshot.set_i16(reg::RIGHT_MEDIAN, right_median);
        snapshot.set_i16(reg::LEFT_AVG, left_avg);
        snapshot.set_i16(reg::CENTRE_AVG, centre_avg);
        snapshot.set_i16(reg::RIGHT_AVG, right_avg);
        snapshot.set_i16(reg::LATERAL_GRADIENT, gradient);

        if raw_mode {
            for channel in 0..RAW_CHANNEL_COUNT {
                let first = channel * RAW_CHANNEL_COLUMNS;
                let mut sum = 0.0;
                let mut count = 0usize;
                for row in roi_rows.clone() {
                    for col in first..first + RAW_CHANNEL_COLUMNS {
                        sum += frame.get(col, row);
                        count += 1;
                    }
                }
                let avg = if count > 0 { sum / count as f32 } else { 0.0 };
                snapshot.set_i16(reg::RAW_CHANNELS + (channel * 2) as u8, to_tenths(avg));
            }
        }

        for (bytes, &pixel) in snapshot.stream.chunks_exact_mut(2).zip(frame.pixels()) {
            bytes.copy_from_slice(&to_tenths(pixel).to_le_bytes());
        }

        snapshot
    }

    #[inline]
    fn set(&mut self, address: u8, value: u8) {
        self.registers[(address - PUBLISHED_START) as usize] = value;
    }

    fn set_i16(&mut self, address: u8, value: i16) {
        let [lo, hi] = value.to_le_bytes();
        self.set(address, lo);
        self.set(address + 1, hi);
    }

    /// `(address, value)` for every published register.
    pub(crate) fn registers(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (PUBLISHED_START..PUBLISHED_END).zip(self.registers.iter().copied())
    }
}
