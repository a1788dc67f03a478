//! Tests for the detection pipeline.

use super::*;
use crate::frame::{ThermalFrame, LAST_COLUMN, SENSOR_WIDTH};
use crate::synthetic::{graded_tyre_frame, profile_frame, tyre_frame, uniform_frame};

/// Ground warming from 20 °C on the left to 30 °C on the right.
const GROUND: (f32, f32) = (20.0, 30.0);

fn detector() -> TyreDetector {
    TyreDetector::new()
}

/// A flat tread at `tyre` °C over the sloped ground.
fn tyre_scene(tyre: f32, span: Span) -> ThermalFrame {
    graded_tyre_frame(GROUND, (tyre, tyre), span)
}

fn ground(col: usize) -> f32 {
    GROUND.0 + (GROUND.1 - GROUND.0) * col as f32 / LAST_COLUMN as f32
}

// ---------------------------------------------------------------------------
// Uniform scenes
// ---------------------------------------------------------------------------

#[test]
fn test_uniform_scene_reports_no_tyre() {
    let mut detector = detector();
    let result = detector.process(&uniform_frame(25.0));

    assert!(!result.detection.detected);
    assert_eq!(result.detection.width, 0);
    assert_eq!(result.detection.confidence, 0.0);
    assert_eq!(result.detection.span, Span::new(0, 0));
    assert_eq!(result.lateral_gradient, 0.0);
    assert_eq!(result.diagnostics.mad_global, 0.0);
    assert_eq!(result.diagnostics.raw_span, None);
    assert!(result.warnings.contains(WarningFlags::UNIFORM));
}

#[test]
fn test_uniform_scene_zones_are_full_width_thirds() {
    let mut detector = detector();
    let frame = ThermalFrame::from_fn(|col, _| match col {
        0..=9 => 20.0,
        10..=19 => 20.2,
        _ => 20.4,
    });
    let result = detector.process(&frame);

    assert!(!result.detection.detected);
    // 4 rows x 10, 10 and 12 columns
    assert_eq!(result.left.count, 40);
    assert_eq!(result.centre.count, 40);
    assert_eq!(result.right.count, 48);
    assert!((result.left.avg - 20.0).abs() < 1e-3);
    assert!((result.right.avg - 20.4).abs() < 1e-3);
}

#[test]
fn test_uniform_scene_leaves_history_untouched() {
    let config = DetectionConfig {
        ema_alpha: 1.0,
        ..Default::default()
    };
    let mut detector = TyreDetector::from_config(config).unwrap();
    assert!(detector.process(&tyre_scene(55.0, Span::new(10, 20))).detection.detected);
    assert_eq!(detector.state().history.len(), 1);

    let result = detector.process(&uniform_frame(25.0));
    assert!(!result.detection.detected);
    assert_eq!(detector.state().history.len(), 1);
    assert!(detector.state().is_warm());
}

#[test]
fn test_block_on_flat_floor_reads_as_uniform() {
    // 23 of 32 columns share one value, so the median absolute deviation is zero.
    let mut profile = [25.0; SENSOR_WIDTH];
    for t in &mut profile[12..=20] {
        *t = 55.0;
    }
    profile[16] = 60.0;

    let mut detector = detector();
    let result = detector.process(&profile_frame(&profile));

    assert_eq!(result.diagnostics.median_global, 25.0);
    assert_eq!(result.diagnostics.mad_global, 0.0);
    assert!(!result.detection.detected);
    assert!(result.warnings.contains(WarningFlags::UNIFORM));
    assert!(detector.state().history.is_empty());
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[test]
fn test_seed_block_grows_to_nine_columns() {
    let mut profile: Profile = std::array::from_fn(ground);
    for t in &mut profile[12..=20] {
        *t = 55.0;
    }
    profile[16] = 60.0;

    let mut detector = detector();
    let result = detector.process(&profile_frame(&profile));

    assert!(result.diagnostics.mad_global > detector.config().mad_uniform_threshold);
    assert!(result.detection.detected);
    assert_eq!(result.detection.span, Span::new(12, 20));
    assert_eq!(result.detection.width, 9);
    assert_eq!(result.diagnostics.raw_span, Some(Span::new(12, 20)));
    assert!(!result.detection.inverted);
    assert_eq!(result.detection.clip, EdgeClip::None);
}

#[test]
fn test_zones_follow_the_span() {
    let mut detector = detector();
    let frame = ThermalFrame::from_fn(|col, _| match col {
        12..=14 => 70.0,
        15..=17 => 60.0,
        18..=20 => 58.0,
        _ => ground(col),
    });
    let result = detector.process(&frame);

    assert_eq!(result.detection.span, Span::new(12, 20));
    assert_eq!(result.left.count, 12);
    assert_eq!(result.left.median, 70.0);
    assert_eq!(result.centre.median, 60.0);
    assert_eq!(result.right.median, 58.0);
    assert!(result.warnings.contains(WarningFlags::TEMP_DIFF));
}

#[test]
fn test_confidence_scores_width_and_gradient() {
    let mut detector = detector();
    let frame = graded_tyre_frame(GROUND, (50.0, 55.5), Span::new(10, 21));
    let result = detector.process(&frame);

    let detection = result.detection;
    assert_eq!(detection.span, Span::new(10, 21));
    // The median filter pulls the last tread column down to 55, leaving a 5 °C gradient.
    assert!((result.lateral_gradient - 5.0).abs() < 1e-4);
    assert!((detection.confidence - 0.75).abs() < 1e-4);
    assert!(!result.warnings.contains(WarningFlags::LOW_CONFIDENCE));
}

#[test]
fn test_narrow_blob_expands_to_min_width() {
    let mut detector = detector();
    let result = detector.process(&tyre_scene(60.0, Span::new(15, 17)));

    assert_eq!(result.diagnostics.raw_span, Some(Span::new(15, 17)));
    assert_eq!(result.detection.width, 6);
    assert_eq!(result.detection.span, Span::new(13, 18));
}

#[test]
fn test_cold_tyre_is_inverted() {
    let mut detector = detector();
    let frame = graded_tyre_frame((35.0, 45.0), (15.0, 15.0), Span::new(11, 21));
    let result = detector.process(&frame);

    assert!(result.detection.detected);
    assert!(result.detection.inverted);
    assert_eq!(result.detection.span, Span::new(11, 21));
    assert!(result.warnings.contains(WarningFlags::INVERTED));
}

#[test]
fn test_span_at_edge_is_clipped() {
    let config = DetectionConfig {
        seed_column: 4,
        ..Default::default()
    };
    let mut detector = TyreDetector::from_config(config).unwrap();
    let result = detector.process(&tyre_scene(60.0, Span::new(0, 9)));

    assert_eq!(result.detection.span.left, 0);
    assert_eq!(result.detection.clip, EdgeClip::Left);
    assert!(result.warnings.contains(WarningFlags::CLIPPED));
}

#[test]
fn test_hot_pixel_does_not_reach_zone_stats() {
    let mut frame = tyre_scene(55.0, Span::new(10, 21));
    frame.set(15, 11, 400.0);

    let mut detector = detector();
    let result = detector.process(&frame);

    assert_eq!(result.detection.span, Span::new(10, 21));
    for zone in result.zones() {
        assert!(zone.max <= 55.0, "{:?}", zone);
    }
}

// ---------------------------------------------------------------------------
// Temporal behaviour
// ---------------------------------------------------------------------------

#[test]
fn test_width_change_is_limited_against_previous_frame() {
    let config = DetectionConfig {
        ema_alpha: 1.0,
        ..Default::default()
    };
    let mut detector = TyreDetector::from_config(config).unwrap();

    // A tread this wide needs its own camber gradient to keep the global MAD up.
    let tread = (52.0, 58.0);
    let first = detector.process(&graded_tyre_frame(GROUND, tread, Span::new(6, 25)));
    assert_eq!(first.detection.width, 20);

    let second = detector.process(&graded_tyre_frame(GROUND, tread, Span::new(1, 30)));
    assert_eq!(second.diagnostics.raw_span, Some(Span::new(1, 30)));
    assert_eq!(second.detection.width, 26);
    assert_eq!(second.detection.span, Span::new(3, 28));
}

#[test]
fn test_steady_scene_is_stable_once_warm() {
    let mut detector = detector();
    let frame = tyre_scene(58.0, Span::new(9, 22));

    let spans: Vec<Span> = (0..6)
        .map(|_| detector.process(&frame).detection.span)
        .collect();
    assert!(spans.iter().all(|&span| span == Span::new(9, 22)), "{:?}", spans);
}

#[test]
fn test_frame_numbers_increment_and_reset() {
    let mut detector = detector();
    let frame = tyre_scene(58.0, Span::new(9, 22));
    assert_eq!(detector.process(&frame).frame_number, 1);
    assert_eq!(detector.process(&frame).frame_number, 2);

    detector.reset();
    assert_eq!(detector.frame_counter(), 0);
    assert!(!detector.state().is_warm());
    assert!(detector.state().history.is_empty());
    assert_eq!(detector.process(&frame).frame_number, 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = DetectionConfig {
        seed_column: SENSOR_WIDTH,
        ..Default::default()
    };
    assert_eq!(
        TyreDetector::from_config(config).unwrap_err(),
        ConfigError::SeedOutOfBounds(SENSOR_WIDTH)
    );
}

#[test]
fn test_bounds_hold_for_random_scenes() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut detector = detector();
    let config = detector.config().clone();

    for _ in 0..200 {
        let left = rng.random_range(0..SENSOR_WIDTH);
        let right = rng.random_range(left..SENSOR_WIDTH);
        let tyre = rng.random_range(10.0..120.0);
        let mut frame = tyre_frame(30.0, tyre, Span::new(left, right));
        for value in frame.pixels_mut().iter_mut() {
            *value += rng.random_range(-1.0..1.0);
        }

        let result = detector.process(&frame);
        let detection = result.detection;
        assert!(detection.span.left <= detection.span.right);
        assert!(detection.span.right <= LAST_COLUMN);
        if detection.detected {
            assert!((config.min_width..=config.max_width).contains(&detection.width));
            assert!((0.0..=1.0).contains(&detection.confidence));
        }
        assert!(detector.state().history.len() <= SPAN_HISTORY_LEN);
    }
}
