//! Passband membership of pitched values

use super::FilterState;
use crate::pitch::Pitch;

/// Open frequency interval `(low, high)` in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Passband {
    pub low: f64,
    pub high: f64,
}

impl Passband {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `hz` lies strictly inside the band; the edges are excluded
    pub fn contains(&self, hz: f64) -> bool {
        hz > self.low && hz < self.high
    }
}

/// Keep a pitch if it survives the filter described by `state`
///
/// Returns the pitch unchanged, in its own unit, when its frequency lies
/// strictly inside the passband, and `None` otherwise.
pub fn classify(pitch: Pitch, state: &FilterState) -> Option<Pitch> {
    if state.passband().contains(pitch.to_hz()) {
        Some(pitch)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::{BandType, Cutoff};
    use crate::pitch::{midi_to_hz, PitchClass};
    use test_case::test_case;

    fn low_pass(hz: f64) -> FilterState {
        FilterState::new(BandType::Low, Cutoff::Hz(hz), 6, 60.0, 22050.0).unwrap()
    }

    fn high_pass(hz: f64) -> FilterState {
        FilterState::new(BandType::High, Cutoff::Hz(hz), 6, 60.0, 22050.0).unwrap()
    }

    fn band_pass(low: f64, high: f64) -> FilterState {
        FilterState::new(BandType::Bandpass, Cutoff::Band(low, high), 5, 60.0, 22050.0).unwrap()
    }

    #[test_case(2000.0, true; "inside")]
    #[test_case(4000.0, false; "at cutoff")]
    #[test_case(6000.0, false; "above")]
    #[test_case(0.0, false; "at zero")]
    #[test_case(-10.0, false; "negative")]
    fn test_low_pass_hz(hz: f64, kept: bool) {
        let result = classify(Pitch::Hz(hz), &low_pass(4000.0));
        assert_eq!(result, kept.then_some(Pitch::Hz(hz)));
    }

    #[test_case(3000.0, false; "below")]
    #[test_case(4000.0, false; "at cutoff")]
    #[test_case(10000.0, true; "inside")]
    #[test_case(22050.0, false; "at nyquist")]
    fn test_high_pass_hz(hz: f64, kept: bool) {
        let result = classify(Pitch::Hz(hz), &high_pass(4000.0));
        assert_eq!(result.is_some(), kept);
    }

    #[test_case(499.0, false; "below")]
    #[test_case(500.0, false; "at low edge")]
    #[test_case(1000.0, true; "inside")]
    #[test_case(2000.0, false; "at high edge")]
    fn test_band_pass_hz(hz: f64, kept: bool) {
        assert_eq!(classify(Pitch::Hz(hz), &band_pass(500.0, 2000.0)).is_some(), kept);
    }

    #[test]
    fn test_midi_converted_before_comparison() {
        let state = low_pass(440.0);
        // A4 is exactly 440 Hz: on the edge, so out of band
        assert_eq!(classify(Pitch::Midi(69.0), &state), None);
        assert_eq!(classify(Pitch::Midi(68.0), &state), Some(Pitch::Midi(68.0)));
        assert!(midi_to_hz(68.0) < 440.0);
    }

    #[test]
    fn test_pitch_class_returned_unchanged() {
        let state = band_pass(200.0, 300.0);
        let a3 = PitchClass::from_tonic("A", 3).unwrap();
        assert_eq!(classify(Pitch::PitchClass(a3), &state), Some(Pitch::PitchClass(a3)));
        let a4 = PitchClass::from_tonic("A", 4).unwrap();
        assert_eq!(classify(Pitch::PitchClass(a4), &state), None);
    }
}
