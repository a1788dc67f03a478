//! End-to-end behaviour through the public API.

use tyre_thermal::registers::reg;
use tyre_thermal::synthetic::{graded_tyre_frame, profile_frame, uniform_frame};
use tyre_thermal::{
    BusState, DetectionConfig, Profile, RegisterEngine, RegisterSnapshot, Span, ThermalFrame,
    TyreDetector, WarningFlags, LAST_COLUMN,
};

/// Road surface warming from 20 °C to 30 °C across the sensor.
const GROUND: (f32, f32) = (20.0, 30.0);

fn tyre_scene(tread: (f32, f32), span: Span) -> ThermalFrame {
    graded_tyre_frame(GROUND, tread, span)
}

#[test]
fn uniform_scene_has_no_tyre() {
    let mut detector = TyreDetector::new();
    let result = detector.process(&uniform_frame(25.0));

    assert!(!result.detection.detected);
    assert_eq!(result.detection.width, 0);
    assert_eq!(result.detection.confidence, 0.0);
    assert_eq!(result.warnings & WarningFlags::UNIFORM, WarningFlags::UNIFORM);
    for zone in result.zones() {
        assert_eq!(zone.avg, 25.0);
        assert_eq!(zone.std, 0.0);
    }
}

#[test]
fn hot_block_around_seed_is_nine_columns() {
    let mut profile: Profile = std::array::from_fn(|col| {
        GROUND.0 + (GROUND.1 - GROUND.0) * col as f32 / LAST_COLUMN as f32
    });
    for t in &mut profile[12..=20] {
        *t = 55.0;
    }
    profile[16] = 60.0;

    let mut detector = TyreDetector::new();
    let result = detector.process(&profile_frame(&profile));
    assert_eq!(result.detection.span, Span::new(12, 20));
    assert_eq!(result.detection.width, 9);
}


#[test]
fn width_jump_is_limited_to_thirty_percent() {
    let mut detector = TyreDetector::from_config(DetectionConfig {
        ema_alpha: 1.0,
        ..Default::default()
    })
    .unwrap();

    assert_eq!(
        detector
            .process(&tyre_scene((52.0, 58.0), Span::new(6, 25)))
            .detection
            .width,
        20
    );
    let result = detector.process(&tyre_scene((52.0, 58.0), Span::new(1, 30)));
    assert_eq!(result.detection.width, 26);
}

#[test]
fn steady_span_is_invariant_under_persistence() {
    let mut detector = TyreDetector::new();
    let frame = tyre_scene((60.0, 64.0), Span::new(7, 24));
    for _ in 0..4 {
        assert_eq!(detector.process(&frame).detection.span, Span::new(7, 24));
    }
}

#[test]
fn emissivity_written_over_the_bus() {
    let mut engine = RegisterEngine::default();
    engine.write_transaction(&[0x04, 75]);
    assert_eq!(engine.emissivity(), 0.75);
}

#[test]
fn stop_discards_the_latched_address() {
    let mut engine = RegisterEngine::default();
    engine.on_write(reg::FRAME_RATE);
    assert_ne!(engine.state(), BusState::Idle);
    engine.on_stop();
    assert_eq!(engine.state(), BusState::Idle);

    engine.on_write(reg::FALLBACK_MODE);
    engine.on_write(1);
    engine.on_stop();
    assert_eq!(engine.map().get(reg::FRAME_RATE), 0);
    assert!(engine.fallback_mode());
}

#[test]
fn detection_is_readable_over_the_bus() {
    let frame = tyre_scene((60.0, 60.0), Span::new(10, 21));
    let mut detector = TyreDetector::new();
    let result = detector.process(&frame);

    let mut engine = RegisterEngine::default();
    let snapshot = RegisterSnapshot::build(
        &result,
        &frame,
        8.0,
        engine.fallback_mode(),
        engine.raw_mode(),
        detector.config().roi_rows(),
    );
    engine.apply_snapshot(&snapshot);

    let mut status = [0u8; 10];
    engine.read_transaction(reg::FRAME_NUMBER_L, &mut status);
    assert_eq!(u16::from_le_bytes([status[0], status[1]]), 1);
    assert_eq!(status[3], 1, "detected");
    assert_eq!(status[5], 12, "width");
    assert_eq!(status[6], 10, "span start");
    assert_eq!(status[7], 21, "span end");

    let mut temps = [0u8; 2];
    engine.read_transaction(reg::CENTRE_MEDIAN, &mut temps);
    assert_eq!(i16::from_le_bytes(temps), 600);
}
