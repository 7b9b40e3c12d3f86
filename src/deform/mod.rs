//! Filter Deformations
//!
//! Deformers generate [`FilterState`]s for a session. Each state is applied
//! to the audio with [`apply_audio`] and to every pitch annotation with
//! [`apply_annotation`], which keeps only the pitched content that survives
//! the filter's passband.
//!
//! # Example
//! ```ignore
//! use passband::deform::{transform, Filter};
//!
//! let mut lowpass = Filter::low_pass(&[4000.0], 60.0)?;
//! for variant in transform(&mut lowpass, &session) {
//!     let variant = variant?;
//!     // ... variant.audio is filtered, variant.annotations are pruned ...
//! }
//! ```

mod adapters;
mod audio;
mod classify;
mod config;
mod filter;
mod random;
mod transform;

pub use crate::dsp::{BandType, Cutoff};
pub use adapters::{
    adapter_kind, apply_annotation, filter_class, filter_contour, filter_hz, filter_midi,
};
pub use audio::apply_audio;
pub use classify::{classify, Passband};
pub use config::{CutoffSpec, DeformerConfig};
pub use filter::{CutoffStates, Filter};
pub use random::{RandomBPFilter, RandomHPFilter, RandomLPFilter, RandomStates};
pub use transform::{apply_state, transform};

use crate::dsp::cheb2ord;
use crate::engine::Session;
use crate::error::{DeformError, Result};
use serde::{Deserialize, Serialize};

/// Passband ripple targeted by the order heuristic, in dB
pub const PASSBAND_RIPPLE_DB: f64 = 3.0;

/// Default stopband attenuation, in dB
pub const DEFAULT_ATTENUATION_DB: f64 = 60.0;

/// Lazy sequence of states produced by one `states` call
pub type States<'a> = Box<dyn Iterator<Item = Result<FilterState>> + 'a>;

/// Parameters of one filter variant
///
/// States are only built through [`FilterState::new`], which enforces
/// `0 < cutoff < nyquist` (or `0 < low < high < nyquist` for band-pass).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    btype: BandType,
    #[serde(rename = "cut_off")]
    cutoff: Cutoff,
    order: usize,
    attenuation: f64,
    nyquist: f64,
}

impl FilterState {
    /// Create a state, checking the band invariant
    pub fn new(
        btype: BandType,
        cutoff: Cutoff,
        order: usize,
        attenuation: f64,
        nyquist: f64,
    ) -> Result<Self> {
        let in_band = |hz: f64| hz > 0.0 && hz < nyquist;
        let valid = match (btype, cutoff) {
            (BandType::Low | BandType::High, Cutoff::Hz(hz)) => in_band(hz),
            (BandType::Bandpass, Cutoff::Band(low, high)) => {
                in_band(low) && in_band(high) && low < high
            }
            _ => false,
        };
        if !valid {
            return Err(DeformError::InvalidCutoff {
                details: format!(
                    "{} filter cannot use cutoff {} with nyquist {} Hz",
                    btype, cutoff, nyquist
                ),
            });
        }
        if order == 0 {
            return Err(DeformError::OrderEstimation {
                details: "filter order must be at least 1".to_string(),
            });
        }
        if !(attenuation.is_finite() && attenuation > 0.0) {
            return Err(DeformError::parameter("attenuation", attenuation, "> 0 dB"));
        }

        Ok(Self {
            btype,
            cutoff,
            order,
            attenuation,
            nyquist,
        })
    }

    /// Band type
    pub fn btype(&self) -> BandType {
        self.btype
    }

    /// Cutoff frequency or band edges, in Hz
    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    /// Prototype filter order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Requested stopband attenuation in dB (the design uses half of it
    /// because forward-backward filtering doubles it)
    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }

    /// Half the sample rate, in Hz
    pub fn nyquist(&self) -> f64 {
        self.nyquist
    }

    /// Sample rate the state was generated for
    pub fn sample_rate(&self) -> f64 {
        2.0 * self.nyquist
    }

    /// Open frequency interval that passes through the filter
    pub fn passband(&self) -> Passband {
        match self.cutoff {
            Cutoff::Band(low, high) => Passband::new(low, high),
            Cutoff::Hz(hz) => match self.btype {
                BandType::Low => Passband::new(0.0, hz),
                _ => Passband::new(hz, self.nyquist),
            },
        }
    }
}

/// A generator of filter states
///
/// Every call to `states` starts a fresh, finite sequence. Random deformers
/// keep advancing their own generator across calls.
pub trait FilterDeformer: Send + Sync {
    /// Lazily generate the states for a session
    fn states(&mut self, session: &Session) -> States<'_>;

    /// Serializable description of this deformer
    fn config(&self) -> DeformerConfig;
}

/// Estimate the filter order for a cutoff
///
/// The stopband edge sits a tenth of the sample rate away from each passband
/// edge, with 3 dB of passband ripple and `attenuation` dB in the stopband.
pub fn estimate_order(
    btype: BandType,
    cutoff: Cutoff,
    attenuation: f64,
    sample_rate: f64,
) -> Result<usize> {
    let offset = sample_rate / 10.0;
    let stopband = match (btype, cutoff) {
        (BandType::Low, Cutoff::Hz(hz)) => Cutoff::Hz(hz + offset),
        (BandType::High, Cutoff::Hz(hz)) => Cutoff::Hz(hz - offset),
        (BandType::Bandpass, Cutoff::Band(low, high)) => Cutoff::Band(low - offset, high + offset),
        _ => {
            return Err(DeformError::InvalidCutoff {
                details: format!("{} filter cannot use cutoff {}", btype, cutoff),
            })
        }
    };
    cheb2ord(cutoff, stopband, PASSBAND_RIPPLE_DB, attenuation, sample_rate)
}

/// Estimate the order and build the state in one step
pub(crate) fn make_state(
    btype: BandType,
    cutoff: Cutoff,
    attenuation: f64,
    sample_rate: f64,
) -> Result<FilterState> {
    let order = estimate_order(btype, cutoff, attenuation, sample_rate)?;
    FilterState::new(btype, cutoff, order, attenuation, sample_rate / 2.0)
}

pub(crate) fn check_positive(param: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DeformError::parameter(param, value, "> 0"))
    }
}
