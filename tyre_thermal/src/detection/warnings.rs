//! Per-frame warning bits, mirrored byte-for-byte into the WARNINGS register.

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;

use super::result::{FrameResult, ZoneStats};

bitflags::bitflags! {
    /// Conditions worth a host's attention. Never errors: the pipeline always produces a result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WarningFlags: u8 {
        /// Lateral gradient above `high_gradient_warning`.
        const HIGH_GRADIENT = 0b0000_0001;
        /// Centre zone range above `high_variance_warning`.
        const HIGH_VARIANCE = 0b0000_0010;
        /// A detection whose confidence is below `low_confidence_warning`.
        const LOW_CONFIDENCE = 0b0000_0100;
        /// Cold tyre on warmer ground.
        const INVERTED = 0b0000_1000;
        /// Detected span touches a sensor edge.
        const CLIPPED = 0b0001_0000;
        /// Uniformity gate fired; zones are the full-width thirds.
        const UNIFORM = 0b0010_0000;
        /// Spread of the three zone averages above `zone_diff_warning`.
        const TEMP_DIFF = 0b0100_0000;
        /// At least one frame was missed since the previous result.
        const SENSOR_UNAVAILABLE = 0b1000_0000;
    }
}

impl WarningFlags {
    /// Evaluates the threshold-based bits for a finished result.
    ///
    /// `SENSOR_UNAVAILABLE` is owned by the driver and never set here.
    pub(crate) fn evaluate(result: &FrameResult, config: &DetectionConfig) -> Self {
        let mut flags = Self::empty();
        let detection = &result.detection;

        flags.set(
            Self::HIGH_GRADIENT,
            result.lateral_gradient > config.high_gradient_warning,
        );
        flags.set(
            Self::HIGH_VARIANCE,
            result.centre.range > config.high_variance_warning,
        );
        flags.set(
            Self::LOW_CONFIDENCE,
            detection.detected && detection.confidence < config.low_confidence_warning,
        );
        flags.set(Self::INVERTED, detection.detected && detection.inverted);
        flags.set(
            Self::CLIPPED,
            detection.detected && detection.clip != super::EdgeClip::None,
        );
        flags.set(Self::UNIFORM, !detection.detected);
        flags.set(
            Self::TEMP_DIFF,
            zone_average_spread(&result.left, &result.centre, &result.right)
                > config.zone_diff_warning,
        );

        flags
    }
}

fn zone_average_spread(left: &ZoneStats, centre: &ZoneStats, right: &ZoneStats) -> f32 {
    let hi = left.avg.max(centre.avg).max(right.avg);
    let lo = left.avg.min(centre.avg).min(right.avg);
    hi - lo
}
