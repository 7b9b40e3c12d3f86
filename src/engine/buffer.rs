//! Audio buffer type for filter deformations

use crate::error::{DeformError, Result};

/// Interleaved audio buffer
///
/// Samples are stored in interleaved format: [L0, R0, L1, R1, ...].
/// Filtering works per channel on de-interleaved `f64` copies and writes
/// the result back in place.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved sample data
    samples: Vec<f32>,
    /// Number of channels (1 = mono, 2 = stereo)
    num_channels: usize,
    /// Sample rate in Hz
    sample_rate: f64,
}

impl AudioBuffer {
    /// Create a silent buffer with the given parameters
    pub fn new(num_channels: usize, num_samples: usize, sample_rate: f64) -> Self {
        Self {
            samples: vec![0.0; num_channels * num_samples],
            num_channels,
            sample_rate,
        }
    }

    /// Create a buffer from existing interleaved samples
    pub fn from_interleaved(
        samples: Vec<f32>,
        num_channels: usize,
        sample_rate: f64,
    ) -> Result<Self> {
        if num_channels == 0 {
            return Err(DeformError::parameter("num_channels", 0, "at least 1"));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DeformError::parameter("sample_rate", sample_rate, "> 0 Hz"));
        }
        if samples.len() % num_channels != 0 {
            return Err(DeformError::parameter(
                "samples",
                samples.len(),
                format!("a multiple of {} channels", num_channels),
            ));
        }
        Ok(Self {
            samples,
            num_channels,
            sample_rate,
        })
    }

    /// Create a mono buffer
    pub fn mono(samples: Vec<f32>, sample_rate: f64) -> Result<Self> {
        Self::from_interleaved(samples, 1, sample_rate)
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.samples.len() / self.num_channels.max(1)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Get a reference to all interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get a sample at the given frame and channel
    pub fn get(&self, frame: usize, channel: usize) -> Option<f32> {
        if frame < self.num_samples() && channel < self.num_channels {
            Some(self.samples[frame * self.num_channels + channel])
        } else {
            None
        }
    }

    /// Set a sample at the given frame and channel
    pub fn set(&mut self, frame: usize, channel: usize, value: f32) {
        if frame < self.num_samples() && channel < self.num_channels {
            self.samples[frame * self.num_channels + channel] = value;
        }
    }

    /// Copy one channel out as `f64` samples
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        if channel >= self.num_channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.num_channels)
            .map(|&s| s as f64)
            .collect()
    }

    /// Overwrite one channel from `f64` samples
    ///
    /// Extra input samples are ignored; missing ones leave the buffer as is.
    pub fn set_channel(&mut self, channel: usize, data: &[f64]) {
        if channel >= self.num_channels {
            return;
        }
        for (slot, &value) in self
            .samples
            .iter_mut()
            .skip(channel)
            .step_by(self.num_channels)
            .zip(data)
        {
            *slot = value as f32;
        }
    }

    /// Check if buffer contains valid audio (no NaN/Inf)
    pub fn is_valid(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Calculate RMS level in dB for a channel
    pub fn rms_db(&self, channel: usize) -> f64 {
        if channel >= self.num_channels || self.num_samples() == 0 {
            return f64::NEG_INFINITY;
        }

        let sum_sq: f64 = self
            .samples
            .iter()
            .skip(channel)
            .step_by(self.num_channels)
            .map(|&s| (s as f64).powi(2))
            .sum();

        let rms = (sum_sq / self.num_samples() as f64).sqrt();

        if rms > 0.0 {
            20.0 * rms.log10()
        } else {
            f64::NEG_INFINITY
        }
    }
}
