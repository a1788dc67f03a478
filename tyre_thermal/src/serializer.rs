//! Byte-stream encodings of a [`FrameResult`].

use std::io::Write;

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::detection::{FrameResult, ZoneStats};
use crate::frame::{Profile, SENSOR_WIDTH};

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("failed to write frame")]
    Io(#[from] std::io::Error),
    #[error("JSON encoding failed")]
    Json(#[from] serde_json::Error),
}

pub trait FrameSerializer {
    fn write_frame(
        &mut self,
        result: &FrameResult,
        fps: f32,
        profile: Option<&Profile>,
    ) -> Result<(), SerializeError>;
}

#[inline]
fn finite(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One line per frame:
/// `frame,fps,l_avg,l_med,c_avg,c_med,r_avg,r_med,width,conf,det`.
///
/// The profile is never written.
#[derive(Debug)]
pub struct CompactCsvSerializer<W: Write> {
    writer: W,
}

impl<W: Write> CompactCsvSerializer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSerializer for CompactCsvSerializer<W> {
    fn write_frame(
        &mut self,
        result: &FrameResult,
        fps: f32,
        _profile: Option<&Profile>,
    ) -> Result<(), SerializeError> {
        let detection = &result.detection;
        writeln!(
            self.writer,
            "{},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{},{:.2},{}",
            result.frame_number,
            finite(fps),
            finite(result.left.avg),
            finite(result.left.median),
            finite(result.centre.avg),
            finite(result.centre.median),
            finite(result.right.avg),
            finite(result.right.median),
            detection.width,
            finite(detection.confidence),
            detection.detected as u8,
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonZone {
    avg: f32,
    median: f32,
    mad: f32,
    min: f32,
    max: f32,
    range: f32,
    std: f32,
}

impl From<&ZoneStats> for JsonZone {
    fn from(zone: &ZoneStats) -> Self {
        Self {
            avg: finite(zone.avg),
            median: finite(zone.median),
            mad: finite(zone.mad),
            min: finite(zone.min),
            max: finite(zone.max),
            range: finite(zone.range),
            std: finite(zone.std),
        }
    }
}

#[derive(Serialize)]
struct JsonAnalysis {
    left: JsonZone,
    centre: JsonZone,
    right: JsonZone,
    lateral_gradient: f32,
}

#[derive(Serialize)]
struct JsonDetection {
    detected: bool,
    span_start: usize,
    span_end: usize,
    tyre_width: usize,
    confidence: f32,
    inverted: bool,
}

#[derive(Serialize)]
struct JsonFrame {
    frame_number: u32,
    fps: f32,
    analysis: JsonAnalysis,
    detection: JsonDetection,
    temperature_profile: ArrayVec<f32, SENSOR_WIDTH>,
    warnings: ArrayVec<&'static str, 8>,
}

/// One JSON object per line.
#[derive(Debug)]
pub struct JsonSerializer<W: Write> {
    writer: W,
}

impl<W: Write> JsonSerializer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSerializer for JsonSerializer<W> {
    fn write_frame(
        &mut self,
        result: &FrameResult,
        fps: f32,
        profile: Option<&Profile>,
    ) -> Result<(), SerializeError> {
        let detection = &result.detection;
        let record = JsonFrame {
            frame_number: result.frame_number,
            fps: finite(fps),
            analysis: JsonAnalysis {
                left: (&result.left).into(),
                centre: (&result.centre).into(),
                right: (&result.right).into(),
                lateral_gradient: finite(result.lateral_gradient),
            },
            detection: JsonDetection {
                detected: detection.detected,
                span_start: detection.span.left,
                span_end: detection.span.right,
                tyre_width: detection.width,
                confidence: finite(detection.confidence),
                inverted: detection.inverted,
            },
            temperature_profile: profile
                .map(|p| p.iter().copied().map(finite).collect())
                .unwrap_or_default(),
            warnings: result.warnings.iter_names().map(|(name, _)| name).collect(),
        };

        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
