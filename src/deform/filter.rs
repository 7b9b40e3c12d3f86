//! Deterministic filter deformer

use super::{
    check_positive, make_state, BandType, Cutoff, CutoffSpec, DeformerConfig, FilterDeformer,
    FilterState, States, DEFAULT_ATTENUATION_DB,
};
use crate::engine::Session;
use crate::error::{DeformError, Result};
use log::debug;

/// Filter with one explicit cutoff (or band) per variant
///
/// Yields one state per declared cutoff, in declaration order. Cutoff values
/// are checked when their variant is generated, not at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    btype: BandType,
    attenuation: f64,
    cutoffs: Vec<Cutoff>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            btype: BandType::Low,
            attenuation: DEFAULT_ATTENUATION_DB,
            cutoffs: vec![Cutoff::Hz(4000.0)],
        }
    }
}

impl Filter {
    /// Create a filter deformer
    ///
    /// Band-pass filters need `Cutoff::Band` entries and low/high-pass
    /// filters need `Cutoff::Hz` entries.
    pub fn new(btype: BandType, attenuation: f64, cutoffs: Vec<Cutoff>) -> Result<Self> {
        check_positive("attenuation", attenuation)?;
        if cutoffs.is_empty() {
            return Err(DeformError::parameter("cutoff", "[]", "at least one cutoff"));
        }
        for cutoff in &cutoffs {
            match (btype, cutoff) {
                (BandType::Bandpass, Cutoff::Band(..)) => {}
                (BandType::Bandpass, _) => {
                    return Err(DeformError::parameter(
                        "cutoff",
                        cutoff,
                        "a (low, high) pair or list of pairs for a bandpass filter",
                    ))
                }
                (_, Cutoff::Hz(_)) => {}
                (_, _) => {
                    return Err(DeformError::parameter(
                        "cutoff",
                        cutoff,
                        "a frequency or list of frequencies for a low/high pass filter",
                    ))
                }
            }
        }
        Ok(Self {
            btype,
            attenuation,
            cutoffs,
        })
    }

    /// Low-pass filters at each cutoff
    pub fn low_pass(cutoffs: &[f64], attenuation: f64) -> Result<Self> {
        Self::new(
            BandType::Low,
            attenuation,
            cutoffs.iter().copied().map(Cutoff::Hz).collect(),
        )
    }

    /// High-pass filters at each cutoff
    pub fn high_pass(cutoffs: &[f64], attenuation: f64) -> Result<Self> {
        Self::new(
            BandType::High,
            attenuation,
            cutoffs.iter().copied().map(Cutoff::Hz).collect(),
        )
    }

    /// Band-pass filters over each `(low, high)` band
    pub fn band_pass(bands: &[(f64, f64)], attenuation: f64) -> Result<Self> {
        Self::new(
            BandType::Bandpass,
            attenuation,
            bands.iter().map(|&(low, high)| Cutoff::Band(low, high)).collect(),
        )
    }

    pub fn btype(&self) -> BandType {
        self.btype
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }

    pub fn cutoffs(&self) -> &[Cutoff] {
        &self.cutoffs
    }

    /// States for a given sample rate
    pub fn states_at(&self, sample_rate: f64) -> CutoffStates<'_> {
        CutoffStates {
            filter: self,
            next: 0,
            sample_rate,
            failed: false,
        }
    }
}

impl FilterDeformer for Filter {
    fn states(&mut self, session: &Session) -> States<'_> {
        Box::new(self.states_at(session.sample_rate()))
    }

    fn config(&self) -> DeformerConfig {
        DeformerConfig::Filter {
            btype: self.btype,
            attenuation: self.attenuation,
            cutoff: CutoffSpec::from_cutoffs(self.btype, &self.cutoffs),
        }
    }
}

/// Lazy states of a [`Filter`], one per declared cutoff
///
/// The sequence ends after the first error.
#[derive(Debug, Clone)]
pub struct CutoffStates<'a> {
    filter: &'a Filter,
    next: usize,
    sample_rate: f64,
    failed: bool,
}

impl CutoffStates<'_> {
    fn check(&self, cutoff: Cutoff) -> Result<()> {
        let nyquist = self.sample_rate / 2.0;
        let problem = match (self.filter.btype, cutoff) {
            (BandType::Bandpass, Cutoff::Band(low, high)) if low >= high => {
                Some("cutoff_low must be smaller than cutoff_high".to_string())
            }
            (BandType::Low, Cutoff::Hz(hz)) if hz <= 0.0 => Some(format!(
                "cutoff frequency for lowpass filter must be strictly positive, got {} Hz",
                hz
            )),
            (BandType::High, Cutoff::Hz(hz)) if hz <= 0.0 || hz >= nyquist => Some(format!(
                "cutoff frequency for high pass filter must be strictly positive and smaller \
                 than nyquist frequency {} Hz, got {} Hz",
                nyquist, hz
            )),
            _ => None,
        };
        match problem {
            Some(details) => Err(DeformError::InvalidCutoff { details }),
            None => Ok(()),
        }
    }
}

impl Iterator for CutoffStates<'_> {
    type Item = Result<FilterState>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let cutoff = *self.filter.cutoffs.get(self.next)?;
        self.next += 1;

        let state = self.check(cutoff).and_then(|_| {
            make_state(
                self.filter.btype,
                cutoff,
                self.filter.attenuation,
                self.sample_rate,
            )
        });
        match &state {
            Ok(state) => debug!(
                "Filter state {}/{}: {:?}",
                self.next,
                self.filter.cutoffs.len(),
                state
            ),
            Err(_) => self.failed = true,
        }
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.filter.cutoffs.len() - self.next))
        }
    }
}
