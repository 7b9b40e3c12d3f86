//! Randomized filter deformers
//!
//! Cutoffs are drawn from Gaussians centred on the configured frequencies.
//! Each deformer owns a `ChaCha8Rng` seeded at construction, so two deformers
//! built with the same parameters and seed generate identical sequences. The
//! generator keeps advancing across `states` calls.

use super::{
    check_positive, make_state, BandType, Cutoff, DeformerConfig, FilterDeformer, FilterState,
    States, DEFAULT_ATTENUATION_DB,
};
use crate::engine::Session;
use crate::error::{DeformError, Result};
use log::{debug, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// Default number of variants per `states` call
pub const DEFAULT_N_SAMPLES: usize = 3;

/// Default standard deviation of the cutoff draws, in Hz
pub const DEFAULT_SIGMA: f64 = 1.0;

fn check_count(n_samples: usize) -> Result<usize> {
    if n_samples == 0 {
        Err(DeformError::parameter("n_samples", n_samples, "> 0"))
    } else {
        Ok(n_samples)
    }
}

fn gaussian(rng: &mut ChaCha8Rng, mean: f64, sigma: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mean + sigma * z
}

/// How one cutoff is drawn; `sigma` is validated positive before use
#[derive(Debug, Clone, Copy, PartialEq)]
enum Draw {
    Single { mean: f64, sigma: f64 },
    Band { low: f64, high: f64, sigma: f64 },
}

impl Draw {
    fn sample(&self, rng: &mut ChaCha8Rng) -> Cutoff {
        match *self {
            Draw::Single { mean, sigma } => Cutoff::Hz(gaussian(rng, mean, sigma)),
            Draw::Band { low, high, sigma } => loop {
                let hi = gaussian(rng, high, sigma);
                let lo = gaussian(rng, low, sigma);
                if hi > lo {
                    break Cutoff::Band(lo, hi);
                }
                trace!("Redrawing band: low {:.3} Hz >= high {:.3} Hz", lo, hi);
            },
        }
    }
}

/// Shared core of the low- and high-pass generators
#[derive(Debug, Clone)]
struct RandomCutoff {
    n_samples: usize,
    attenuation: f64,
    cutoff: f64,
    sigma: f64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomCutoff {
    fn new(n_samples: usize, attenuation: f64, cutoff: f64, sigma: f64, seed: u64) -> Result<Self> {
        check_count(n_samples)?;
        check_positive("attenuation", attenuation)?;
        check_positive("cutoff", cutoff)?;
        check_positive("sigma", sigma)?;
        Ok(Self {
            n_samples,
            attenuation,
            cutoff,
            sigma,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    fn states(
        &mut self,
        btype: BandType,
        sample_rate: f64,
        pending: Option<DeformError>,
    ) -> RandomStates<'_> {
        RandomStates {
            rng: &mut self.rng,
            draw: Draw::Single {
                mean: self.cutoff,
                sigma: self.sigma,
            },
            btype,
            attenuation: self.attenuation,
            sample_rate,
            remaining: self.n_samples,
            pending,
        }
    }
}

/// Low-pass filters with cutoffs drawn from `Normal(cutoff, sigma)`
///
/// Draws are not clamped; a draw at or below 0 Hz fails when reached.
#[derive(Debug, Clone)]
pub struct RandomLPFilter {
    inner: RandomCutoff,
}

impl RandomLPFilter {
    pub fn new(
        n_samples: usize,
        attenuation: f64,
        cutoff: f64,
        sigma: f64,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            inner: RandomCutoff::new(n_samples, attenuation, cutoff, sigma, seed)?,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.inner.n_samples
    }
}

impl Default for RandomLPFilter {
    fn default() -> Self {
        Self {
            inner: RandomCutoff {
                n_samples: DEFAULT_N_SAMPLES,
                attenuation: DEFAULT_ATTENUATION_DB,
                cutoff: 8000.0,
                sigma: DEFAULT_SIGMA,
                seed: 0,
                rng: ChaCha8Rng::seed_from_u64(0),
            },
        }
    }
}

impl FilterDeformer for RandomLPFilter {
    fn states(&mut self, session: &Session) -> States<'_> {
        Box::new(self.inner.states(BandType::Low, session.sample_rate(), None))
    }

    fn config(&self) -> DeformerConfig {
        let inner = &self.inner;
        DeformerConfig::RandomLPFilter {
            n_samples: inner.n_samples,
            attenuation: inner.attenuation,
            cutoff: inner.cutoff,
            sigma: inner.sigma,
            seed: inner.seed,
        }
    }
}

/// High-pass filters with cutoffs drawn from `Normal(cutoff, sigma)`
///
/// The mean cutoff must lie below the session's nyquist frequency; that is
/// checked when `states` is called and reported as the first item.
#[derive(Debug, Clone)]
pub struct RandomHPFilter {
    inner: RandomCutoff,
}

impl RandomHPFilter {
    pub fn new(
        n_samples: usize,
        attenuation: f64,
        cutoff: f64,
        sigma: f64,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            inner: RandomCutoff::new(n_samples, attenuation, cutoff, sigma, seed)?,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.inner.n_samples
    }
}

impl Default for RandomHPFilter {
    fn default() -> Self {
        Self {
            inner: RandomLPFilter::default().inner,
        }
    }
}

impl FilterDeformer for RandomHPFilter {
    fn states(&mut self, session: &Session) -> States<'_> {
        let nyquist = session.sample_rate() / 2.0;
        let pending = (self.inner.cutoff >= nyquist).then(|| DeformError::InvalidCutoff {
            details: format!(
                "cutoff frequency for high pass filter must be smaller than nyquist \
                 frequency {} Hz, got {} Hz",
                nyquist, self.inner.cutoff
            ),
        });
        Box::new(self.inner.states(BandType::High, session.sample_rate(), pending))
    }

    fn config(&self) -> DeformerConfig {
        let inner = &self.inner;
        DeformerConfig::RandomHPFilter {
            n_samples: inner.n_samples,
            attenuation: inner.attenuation,
            cutoff: inner.cutoff,
            sigma: inner.sigma,
            seed: inner.seed,
        }
    }
}

/// Band-pass filters with both edges drawn around `cutoff_low` and
/// `cutoff_high`
///
/// Pairs are redrawn until `high > low`, so every state is a valid band
/// ordering.
#[derive(Debug, Clone)]
pub struct RandomBPFilter {
    n_samples: usize,
    attenuation: f64,
    cutoff_low: f64,
    cutoff_high: f64,
    sigma: f64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomBPFilter {
    pub fn new(
        n_samples: usize,
        attenuation: f64,
        cutoff_low: f64,
        cutoff_high: f64,
        sigma: f64,
        seed: u64,
    ) -> Result<Self> {
        check_count(n_samples)?;
        check_positive("attenuation", attenuation)?;
        check_positive("cutoff_low", cutoff_low)?;
        check_positive("cutoff_high", cutoff_high)?;
        if cutoff_low >= cutoff_high {
            return Err(DeformError::parameter(
                "cutoff_low",
                cutoff_low,
                format!("< cutoff_high ({})", cutoff_high),
            ));
        }
        check_positive("sigma", sigma)?;

        Ok(Self {
            n_samples,
            attenuation,
            cutoff_low,
            cutoff_high,
            sigma,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

impl Default for RandomBPFilter {
    fn default() -> Self {
        Self {
            n_samples: DEFAULT_N_SAMPLES,
            attenuation: DEFAULT_ATTENUATION_DB,
            cutoff_low: 4000.0,
            cutoff_high: 8000.0,
            sigma: DEFAULT_SIGMA,
            seed: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }
}

impl FilterDeformer for RandomBPFilter {
    fn states(&mut self, session: &Session) -> States<'_> {
        Box::new(RandomStates {
            rng: &mut self.rng,
            draw: Draw::Band {
                low: self.cutoff_low,
                high: self.cutoff_high,
                sigma: self.sigma,
            },
            btype: BandType::Bandpass,
            attenuation: self.attenuation,
            sample_rate: session.sample_rate(),
            remaining: self.n_samples,
            pending: None,
        })
    }

    fn config(&self) -> DeformerConfig {
        DeformerConfig::RandomBPFilter {
            n_samples: self.n_samples,
            attenuation: self.attenuation,
            cutoff_low: self.cutoff_low,
            cutoff_high: self.cutoff_high,
            sigma: self.sigma,
            seed: self.seed,
        }
    }
}

/// Lazy states of a random deformer
///
/// Draws happen on demand, so stopping early leaves the generator at the
/// last draw taken. The sequence ends after the first error.
#[derive(Debug)]
pub struct RandomStates<'a> {
    rng: &'a mut ChaCha8Rng,
    draw: Draw,
    btype: BandType,
    attenuation: f64,
    sample_rate: f64,
    remaining: usize,
    pending: Option<DeformError>,
}

impl Iterator for RandomStates<'_> {
    type Item = Result<FilterState>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            self.remaining = 0;
            return Some(Err(err));
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let cutoff = self.draw.sample(self.rng);
        let state = make_state(self.btype, cutoff, self.attenuation, self.sample_rate);
        match &state {
            Ok(state) => debug!("Random {} state: {:?}", self.btype, state),
            Err(e) => {
                debug!("Random {} draw {} rejected: {}", self.btype, cutoff, e);
                self.remaining = 0;
            }
        }
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = usize::from(self.pending.is_some());
        (0, Some(self.remaining + pending))
    }
}
