//! Output records of one pipeline cycle.

use serde::Serialize;

use crate::frame::{Profile, LAST_COLUMN, SENSOR_WIDTH};

use super::warnings::WarningFlags;

/// Inclusive column range `[left, right]` believed to hold the tyre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub left: usize,
    pub right: usize,
}

impl Span {
    #[inline]
    pub fn new(left: usize, right: usize) -> Self {
        debug_assert!(left <= right && right <= LAST_COLUMN);
        Self { left, right }
    }

    /// The whole sensor width.
    pub fn full() -> Self {
        Self::new(0, LAST_COLUMN)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    #[inline]
    pub fn columns(&self) -> std::ops::RangeInclusive<usize> {
        self.left..=self.right
    }

    pub fn edge_clip(&self) -> EdgeClip {
        match (self.left == 0, self.right == SENSOR_WIDTH - 1) {
            (false, false) => EdgeClip::None,
            (true, false) => EdgeClip::Left,
            (false, true) => EdgeClip::Right,
            (true, true) => EdgeClip::Both,
        }
    }
}

/// Which sensor edges a span touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EdgeClip {
    #[default]
    None,
    Left,
    Right,
    Both,
}

/// This cycle's span estimate.
///
/// When nothing is detected the span is `[0, 0]` and `width` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TyreDetection {
    pub span: Span,
    pub width: usize,
    pub detected: bool,
    /// 0.0..=1.0
    pub confidence: f32,
    /// Tyre colder than its surroundings.
    pub inverted: bool,
    pub clip: EdgeClip,
}

impl TyreDetection {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Robust statistics over the band pixels of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ZoneStats {
    pub avg: f32,
    pub median: f32,
    pub mad: f32,
    pub min: f32,
    pub max: f32,
    pub range: f32,
    /// Population standard deviation.
    pub std: f32,
    pub count: usize,
}

/// Intermediate values of the detection pass, for tuning and logging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Diagnostics {
    pub median_global: f32,
    pub mad_global: f32,
    /// Filtered temperature at the seed column.
    pub centre_temp: f32,
    /// Global admission margin.
    pub delta: f32,
    /// Within-k admission margin around `centre_temp`.
    pub k: f32,
    /// Region-grower output before any constraint. `None` for a uniform scene.
    pub raw_span: Option<Span>,
}

/// Canonical per-cycle output, consumed by the register publish step and serializers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub frame_number: u32,
    pub detection: TyreDetection,
    pub left: ZoneStats,
    pub centre: ZoneStats,
    pub right: ZoneStats,
    pub lateral_gradient: f32,
    pub warnings: WarningFlags,
    pub diagnostics: Diagnostics,
    /// Spatially and temporally filtered column profile.
    #[serde(skip)]
    pub profile: Profile,
}

impl FrameResult {
    #[inline]
    pub fn zones(&self) -> [&ZoneStats; 3] {
        [&self.left, &self.centre, &self.right]
    }
}
