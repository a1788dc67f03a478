//! Tyre detection pipeline.
//!
//! One call to [`TyreDetector::process`] per acquired frame:
//!
//! 1. **Preprocess**: copy the region-of-interest rows into a band, repair saturated
//!    pixels (brake and exhaust reflections).
//!
//! 2. **Profile**: per-column median across the band, clipped to the sensor range.
//!
//! 3. **Filter**: 3-tap spatial median, then EMA against the previous cycle.
//!
//! 4. **Uniformity gate**: global median and MAD. A flat scene has no tyre and is
//!    reported over the three full-width thirds.
//!
//! 5. **Region growing**: dual-criterion growth from the seed column with polarity
//!    detection.
//!
//! 6. **Constraints**: geometry clamp, temporal-change clamp, persistence smoothing.
//!
//! 7. **Zones**: left/centre/right statistics, lateral gradient, confidence.

mod result;
pub(crate) mod stages;
mod warnings;

#[cfg(test)]
mod tests;

use arrayvec::ArrayVec;

use crate::config::{ConfigError, DetectionConfig};
use crate::frame::{Profile, ThermalFrame};

pub use result::{Diagnostics, EdgeClip, FrameResult, Span, TyreDetection, ZoneStats};
pub use warnings::WarningFlags;

use stages::preprocess::{extract_band, repair_saturated, Band};
use stages::{constraints, filter, profile, region, uniformity, zones};

/// Number of post-constraint spans kept for persistence smoothing.
pub const SPAN_HISTORY_LEN: usize = 2;

pub type SpanHistory = ArrayVec<Span, SPAN_HISTORY_LEN>;

/// Cross-frame memory of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalState {
    /// EMA output of the previous cycle; `None` until the first frame.
    pub prev_profile: Option<Profile>,
    /// Most recent post-constraint spans, oldest first.
    pub history: SpanHistory,
}

impl TemporalState {
    pub fn is_warm(&self) -> bool {
        self.prev_profile.is_some()
    }

    pub fn clear(&mut self) {
        self.prev_profile = None;
        self.history.clear();
    }
}

/// Stateful detector: owns the configuration, the reusable band buffer and the
/// temporal state.
///
/// # Example
///
/// ```rust,ignore
/// use tyre_thermal::{DetectionConfig, TyreDetector};
///
/// let mut detector = TyreDetector::from_config(DetectionConfig {
///     seed_column: 15,
///     ..Default::default()
/// })?;
///
/// for frame in frames {
///     let result = detector.process(&frame);
///     if result.detection.detected {
///         println!("tyre at {:?}", result.detection.span);
///     }
/// }
/// ```
#[derive(Debug)]
pub struct TyreDetector {
    config: DetectionConfig,
    state: TemporalState,
    band: Band,
    frame_counter: u32,
}

impl Default for TyreDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TyreDetector {
    /// Create a detector with the default configuration.
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
            state: TemporalState::default(),
            band: Band::new(),
            frame_counter: 0,
        }
    }

    /// Create a detector from a configuration, rejecting invalid parameters.
    pub fn from_config(config: DetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn state(&self) -> &TemporalState {
        &self.state
    }

    /// Number of frames processed since creation or the last reset.
    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    /// Forgets all temporal state and restarts the frame counter.
    pub fn reset(&mut self) {
        self.state.clear();
        self.frame_counter = 0;
        tracing::info!("detector reset");
    }

    /// Runs the full pipeline on one frame.
    pub fn process(&mut self, frame: &ThermalFrame) -> FrameResult {
        let config = &self.config;
        self.frame_counter = self.frame_counter.wrapping_add(1);

        // Step 1: Band extraction and hot-pixel repair
        extract_band(frame, config.roi_rows(), &mut self.band);
        let repaired = repair_saturated(&mut self.band, config.saturation_threshold);
        if repaired > 0 {
            tracing::debug!(repaired, "saturated pixels repaired");
        }

        // Step 2: Column profile
        let raw_profile = profile::build_profile(&self.band, config.min_temp, config.max_temp);

        // Step 3: Spatial then temporal filtering
        let spatial = filter::median_filter_3(&raw_profile);
        let filtered = filter::apply_ema(&spatial, &mut self.state.prev_profile, config.ema_alpha);

        // Step 4: Uniformity gate
        let global = uniformity::global_stats(&filtered);
        let mut diagnostics = Diagnostics {
            median_global: global.median,
            mad_global: global.mad,
            ..Default::default()
        };

        if uniformity::is_uniform(&global, config.mad_uniform_threshold) {
            tracing::debug!(mad = global.mad, "uniform scene, no tyre");
            return self.finish(
                TyreDetection::none(),
                uniformity::fallback_zones(),
                0.0,
                diagnostics,
                filtered,
            );
        }

        // Step 5: Region growing
        let growth = region::grow_region(&filtered, &global, config);
        diagnostics.centre_temp = growth.centre_temp;
        diagnostics.delta = growth.delta;
        diagnostics.k = growth.k;
        diagnostics.raw_span = Some(growth.span);

        // Step 6: Constraint pipeline
        let span = constraints::clamp_geometry(growth.span, config.min_width, config.max_width);
        let span = constraints::clamp_temporal_change(
            span,
            self.state.history.last(),
            config.max_width_change_ratio,
            config.min_width,
            config.max_width,
        );
        let span =
            constraints::smooth_persistence(span, &mut self.state.history, config.persistence_frames);

        // Step 7: Zone analysis
        let width = span.width();
        let gradient = zones::lateral_gradient(&filtered, span);
        let detection = TyreDetection {
            span,
            width,
            detected: true,
            confidence: zones::confidence(width, gradient, config.min_width, config.max_width),
            inverted: growth.inverted,
            clip: span.edge_clip(),
        };

        self.finish(detection, zones::split_zones(span), gradient, diagnostics, filtered)
    }

    fn finish(
        &self,
        detection: TyreDetection,
        zone_spans: [Span; 3],
        lateral_gradient: f32,
        diagnostics: Diagnostics,
        profile: Profile,
    ) -> FrameResult {
        let [left, centre, right] = zone_spans.map(|zone| zones::zone_stats(&self.band, zone));

        let mut result = FrameResult {
            frame_number: self.frame_counter,
            detection,
            left,
            centre,
            right,
            lateral_gradient,
            warnings: WarningFlags::empty(),
            diagnostics,
            profile,
        };
        result.warnings = WarningFlags::evaluate(&result, &self.config);

        tracing::debug!(
            frame = result.frame_number,
            detected = detection.detected,
            left = detection.span.left,
            right = detection.span.right,
            confidence = detection.confidence,
            warnings = result.warnings.bits(),
            "frame processed"
        );

        result
    }
}
