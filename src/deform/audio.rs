//! Audio side of a filter deformation

use super::FilterState;
use crate::dsp::{cheby2, sosfiltfilt};
use crate::engine::AudioBuffer;
use crate::error::{DeformError, Result};

/// Filter `audio` in place with the Chebyshev II filter described by `state`
///
/// The design asks for half of `state.attenuation()` because the
/// forward-backward pass applies the filter twice. Every channel is filtered
/// before any is written back, so a failure leaves the buffer untouched.
pub fn apply_audio(audio: &mut AudioBuffer, state: &FilterState) -> Result<()> {
    let sample_rate = audio.sample_rate();
    if (sample_rate - state.sample_rate()).abs() > f64::EPSILON * sample_rate {
        return Err(DeformError::FilterDesign {
            details: format!(
                "state generated for {} Hz applied to {} Hz audio",
                state.sample_rate(),
                sample_rate
            ),
        });
    }

    let sections = cheby2(
        state.order(),
        state.attenuation() / 2.0,
        state.cutoff(),
        state.btype(),
        sample_rate,
    )?;

    let filtered = (0..audio.num_channels())
        .map(|channel| sosfiltfilt(&sections, &audio.channel(channel)))
        .collect::<Result<Vec<_>>>()?;

    for (channel, data) in filtered.iter().enumerate() {
        audio.set_channel(channel, data);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::{make_state, BandType, Cutoff};
    use std::f64::consts::PI;

    /// Helper to create a test buffer with a specific frequency sine wave
    fn create_sine_buffer(frequency: f64, sample_rate: f64, duration_secs: f64) -> AudioBuffer {
        let num_samples = (sample_rate * duration_secs) as usize;
        let samples = (0..num_samples)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin() as f32)
            .collect();
        AudioBuffer::mono(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_low_pass_attenuates_stopband() {
        let state = make_state(BandType::Low, Cutoff::Hz(4000.0), 60.0, 44100.0).unwrap();

        let mut pass = create_sine_buffer(1000.0, 44100.0, 0.2);
        let mut stop = create_sine_buffer(10000.0, 44100.0, 0.2);
        let pass_before = pass.rms_db(0);
        let stop_before = stop.rms_db(0);

        apply_audio(&mut pass, &state).unwrap();
        apply_audio(&mut stop, &state).unwrap();

        assert!((pass.rms_db(0) - pass_before).abs() < 1.0);
        assert!(stop.rms_db(0) - stop_before < -50.0);
        assert!(pass.is_valid() && stop.is_valid());
    }

    #[test]
    fn test_band_pass_filters_every_channel() {
        let state = make_state(BandType::Bandpass, Cutoff::Band(500.0, 2000.0), 60.0, 44100.0)
            .unwrap();
        let n = 8820;
        let mut samples = Vec::with_capacity(2 * n);
        for i in 0..n {
            let t = i as f64 / 44100.0;
            samples.push((2.0 * PI * 1000.0 * t).sin() as f32);
            samples.push((2.0 * PI * 8000.0 * t).sin() as f32);
        }
        let mut audio = AudioBuffer::from_interleaved(samples, 2, 44100.0).unwrap();
        let before = [audio.rms_db(0), audio.rms_db(1)];

        apply_audio(&mut audio, &state).unwrap();

        assert!((audio.rms_db(0) - before[0]).abs() < 1.0);
        assert!(audio.rms_db(1) - before[1] < -50.0);
    }

    #[test]
    fn test_rejects_sample_rate_mismatch() {
        let state = make_state(BandType::Low, Cutoff::Hz(4000.0), 60.0, 44100.0).unwrap();
        let mut audio = create_sine_buffer(1000.0, 48000.0, 0.1);
        let before = audio.clone();
        assert!(apply_audio(&mut audio, &state).is_err());
        assert_eq!(audio, before);
    }

    #[test]
    fn test_short_signal_is_an_error() {
        let state = make_state(BandType::Low, Cutoff::Hz(4000.0), 60.0, 44100.0).unwrap();
        let mut audio = AudioBuffer::mono(vec![0.0; 8], 44100.0).unwrap();
        let err = apply_audio(&mut audio, &state).unwrap_err();
        assert_eq!(err.error_code(), "SIGNAL_TOO_SHORT");
    }
}
