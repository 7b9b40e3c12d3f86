//! Integration Tests
//!
//! End-to-end tests for the passband deformation pipeline.

use passband::annotation::{Annotation, Observation, ObservationValue};
use passband::deform::{
    transform, BandType, Cutoff, DeformerConfig, Filter, FilterDeformer, RandomBPFilter,
    RandomHPFilter,
};
use passband::engine::{AudioBuffer, Session};
use passband::Result;
use pretty_assertions::assert_eq;
use std::f64::consts::PI;
use test_case::test_case;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Helper to create a mono buffer holding a sum of equal-amplitude sines
fn create_tone_buffer(frequencies: &[f64], sample_rate: f64, duration_secs: f64) -> AudioBuffer {
    let num_samples = (sample_rate * duration_secs) as usize;
    let amplitude = 1.0 / frequencies.len() as f64;
    let samples = (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            frequencies
                .iter()
                .map(|f| amplitude * (2.0 * PI * f * t).sin())
                .sum::<f64>() as f32
        })
        .collect();
    AudioBuffer::mono(samples, sample_rate).unwrap()
}

fn hz_values(session: &Session, namespace: &str) -> Vec<f64> {
    session
        .annotation(namespace)
        .unwrap()
        .data()
        .iter()
        .map(|obs| match obs.value {
            ObservationValue::Scalar(v) => v,
            ref other => panic!("unexpected value {:?}", other),
        })
        .collect()
}

fn pitched_session() -> Session {
    let mut contour = Annotation::new("pitch_contour");
    for (i, frequency) in [Some(300.0), Some(1000.0), None, Some(2500.0)]
        .into_iter()
        .enumerate()
    {
        contour.append(Observation::new(
            i as f64 * 0.1,
            0.0,
            Some(0.9),
            ObservationValue::Contour {
                index: i as i64,
                frequency,
                voiced: frequency.is_some(),
            },
        ));
    }

    Session::new(create_tone_buffer(&[1000.0], 44100.0, 0.5))
        .with_annotation(contour)
        .with_annotation(
            Annotation::new("note_midi")
                .with(0.0, 0.25, ObservationValue::Scalar(69.0))
                .with(0.25, 0.25, ObservationValue::Scalar(84.0)),
        )
        .with_annotation(
            Annotation::new("pitch_class")
                .with(
                    0.0,
                    0.25,
                    ObservationValue::PitchClass {
                        tonic: "A".to_string(),
                        pitch: 4,
                    },
                )
                .with(
                    0.25,
                    0.25,
                    ObservationValue::PitchClass {
                        tonic: "C".to_string(),
                        pitch: 6,
                    },
                ),
        )
        .with_annotation(Annotation::new("chord").with(
            0.0,
            0.5,
            ObservationValue::Scalar(1.0),
        ))
}

// === Low-pass Example ===

#[test]
fn test_low_pass_keeps_only_passband_pitch() {
    init_logging();
    let session = Session::new(create_tone_buffer(&[2000.0, 6000.0], 44100.0, 0.5))
        .with_annotation(
            Annotation::new("pitch_hz")
                .with(0.0, 0.5, ObservationValue::Scalar(2000.0))
                .with(0.0, 0.5, ObservationValue::Scalar(6000.0)),
        );

    let mut filter = Filter::low_pass(&[4000.0], 60.0).unwrap();
    let variants: Vec<Session> = transform(&mut filter, &session)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(variants.len(), 1);
    let variant = &variants[0];
    assert_eq!(hz_values(variant, "pitch_hz"), vec![2000.0]);

    // Half-amplitude 2000 Hz sine survives: RMS of 0.5 / sqrt(2)
    let expected_db = 20.0 * (0.5 / 2f64.sqrt()).log10();
    assert!(
        (variant.audio.rms_db(0) - expected_db).abs() < 0.5,
        "Expected ~{:.1} dB, got {:.1} dB",
        expected_db,
        variant.audio.rms_db(0)
    );
}

// === Band-pass Example ===

#[test]
fn test_random_band_pass_example() {
    init_logging();
    let session = pitched_session();
    let mut bp = RandomBPFilter::new(5, 60.0, 500.0, 2000.0, 10.0, 42).unwrap();

    let variants: Vec<Session> = transform(&mut bp, &session)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(variants.len(), 5);
    for variant in &variants {
        let entry = &variant.history()[0];
        assert_eq!(entry.state.btype(), BandType::Bandpass);
        match entry.state.cutoff() {
            Cutoff::Band(low, high) => assert!(low < high),
            other => panic!("unexpected cutoff {:?}", other),
        }
        assert!(variant.audio.is_valid());
    }
}

#[test]
fn test_band_pass_adapts_every_annotation() {
    init_logging();
    let session = pitched_session();
    let mut filter = Filter::band_pass(&[(500.0, 2000.0)], 60.0).unwrap();
    let variant = transform(&mut filter, &session).next().unwrap().unwrap();

    // Contour keeps every frame, only 1000 Hz stays voiced
    let contour = variant.annotation("pitch_contour").unwrap();
    assert_eq!(contour.len(), 4);
    let voiced: Vec<bool> = contour
        .data()
        .iter()
        .map(|obs| match obs.value {
            ObservationValue::Contour { voiced, .. } => voiced,
            ref other => panic!("unexpected value {:?}", other),
        })
        .collect();
    assert_eq!(voiced, vec![false, true, false, false]);
    assert!(contour.data().iter().all(|obs| obs.confidence == Some(0.9)));

    // A4 (440 Hz) is below the band, C6 (~1046 Hz) is inside
    assert_eq!(hz_values(&variant, "note_midi"), vec![84.0]);
    let classes = variant.annotation("pitch_class").unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes.data()[0].time, 0.25);

    // No adapter: passed through
    assert_eq!(variant.annotation("chord").unwrap().len(), 1);
}

// === Determinism ===

#[test]
fn test_same_seed_same_variants() {
    let session = pitched_session();
    let run = |seed: u64| -> Vec<Session> {
        let mut hp = RandomHPFilter::new(3, 60.0, 8000.0, 100.0, seed).unwrap();
        transform(&mut hp, &session).collect::<Result<_>>().unwrap()
    };

    let first = run(11);
    let second = run(11);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.history(), b.history());
        assert_eq!(a.audio, b.audio);
    }
}

// === Configuration ===

#[test_case(r#"{"type": "Filter", "btype": "low", "cutoff": [3000, 5000]}"#, 2; "filter list")]
#[test_case(r#"{"type": "Filter", "btype": "bandpass", "cutoff": [500, 2000]}"#, 1; "filter pair")]
#[test_case(
    r#"{"type": "RandomLPFilter", "n_samples": 4, "cutoff": 6000, "sigma": 20}"#,
    4;
    "random lowpass"
)]
#[test_case(
    r#"{"type": "RandomBPFilter", "cutoff_low": 500, "cutoff_high": 2000, "seed": 42}"#,
    3;
    "random bandpass"
)]
fn test_config_drives_transform(json: &str, expected: usize) {
    init_logging();
    let config = DeformerConfig::from_json(&serde_json::from_str(json).unwrap()).unwrap();
    let mut deformer = config.build().unwrap();
    let described = deformer.config();
    assert_eq!(described.name(), config.name());
    let session = pitched_session();

    let variants: Vec<Session> = transform(deformer.as_mut(), &session)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(variants.len(), expected);
    for variant in &variants {
        assert_eq!(variant.history()[0].deformer, described);
    }
}

#[test]
fn test_history_json_round_trip() {
    let session = pitched_session();
    let mut filter = Filter::high_pass(&[6000.0], 60.0).unwrap();
    let variant = transform(&mut filter, &session).next().unwrap().unwrap();

    let json = variant.history_json().unwrap();
    let parsed: Vec<passband::engine::HistoryEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, variant.history().to_vec());
    assert_eq!(parsed[0].deformer, filter.config());
}

// === Errors ===

#[test]
fn test_short_audio_fails_variant() {
    let session = Session::new(AudioBuffer::mono(vec![0.0; 16], 44100.0).unwrap());
    let mut filter = Filter::low_pass(&[4000.0], 60.0).unwrap();
    let err = transform(&mut filter, &session).next().unwrap().unwrap_err();
    assert_eq!(err.error_code(), "SIGNAL_TOO_SHORT");
}

#[test]
fn test_invalid_high_pass_fails_at_generation() {
    let session = pitched_session();
    let mut filter = Filter::high_pass(&[-1.0], 60.0).unwrap();
    let results: Vec<_> = transform(&mut filter, &session).collect();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].as_ref().unwrap_err().error_code(),
        "INVALID_CUTOFF"
    );
}
