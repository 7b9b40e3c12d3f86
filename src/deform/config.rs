//! Serializable deformer descriptions

use super::random::{DEFAULT_N_SAMPLES, DEFAULT_SIGMA};
use super::{
    BandType, Cutoff, Filter, FilterDeformer, RandomBPFilter, RandomHPFilter, RandomLPFilter,
    DEFAULT_ATTENUATION_DB,
};
use crate::error::{DeformError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cutoff as written in a configuration
///
/// A low/high-pass filter takes a number or a list of numbers. A band-pass
/// filter takes a `[low, high]` pair or a list of pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CutoffSpec {
    Single(f64),
    List(Vec<f64>),
    Pairs(Vec<[f64; 2]>),
}

impl Default for CutoffSpec {
    fn default() -> Self {
        CutoffSpec::Single(4000.0)
    }
}

impl CutoffSpec {
    /// Interpret the cutoff for a band type
    pub fn resolve(&self, btype: BandType) -> Result<Vec<Cutoff>> {
        let cutoffs = match (btype, self) {
            (BandType::Bandpass, CutoffSpec::List(pair)) if pair.len() == 2 => {
                vec![Cutoff::Band(pair[0], pair[1])]
            }
            (BandType::Bandpass, CutoffSpec::Pairs(pairs)) => {
                pairs.iter().map(|&[low, high]| Cutoff::Band(low, high)).collect()
            }
            (BandType::Low | BandType::High, CutoffSpec::Single(hz)) => vec![Cutoff::Hz(*hz)],
            (BandType::Low | BandType::High, CutoffSpec::List(list)) => {
                list.iter().copied().map(Cutoff::Hz).collect()
            }
            _ => {
                return Err(DeformError::parameter(
                    "cutoff",
                    format!("{:?}", self),
                    format!("a cutoff shape valid for a {} filter", btype),
                ))
            }
        };
        Ok(cutoffs)
    }

    /// Inverse of [`CutoffSpec::resolve`]
    pub fn from_cutoffs(btype: BandType, cutoffs: &[Cutoff]) -> Self {
        match (btype, cutoffs) {
            (BandType::Bandpass, _) => CutoffSpec::Pairs(
                cutoffs
                    .iter()
                    .filter_map(|c| match *c {
                        Cutoff::Band(low, high) => Some([low, high]),
                        Cutoff::Hz(_) => None,
                    })
                    .collect(),
            ),
            (_, [Cutoff::Hz(hz)]) => CutoffSpec::Single(*hz),
            _ => CutoffSpec::List(
                cutoffs
                    .iter()
                    .filter_map(|c| match *c {
                        Cutoff::Hz(hz) => Some(hz),
                        Cutoff::Band(..) => None,
                    })
                    .collect(),
            ),
        }
    }
}

fn default_btype() -> BandType {
    BandType::Low
}

fn default_attenuation() -> f64 {
    DEFAULT_ATTENUATION_DB
}

fn default_n_samples() -> usize {
    DEFAULT_N_SAMPLES
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

fn default_random_cutoff() -> f64 {
    8000.0
}

fn default_cutoff_low() -> f64 {
    4000.0
}

/// Description of a deformer, tagged by `"type"`
///
/// Missing fields take the documented defaults, so `{"type": "Filter"}` is a
/// 4000 Hz low-pass with 60 dB attenuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeformerConfig {
    Filter {
        #[serde(default = "default_btype")]
        btype: BandType,
        #[serde(default = "default_attenuation")]
        attenuation: f64,
        #[serde(default)]
        cutoff: CutoffSpec,
    },
    RandomLPFilter {
        #[serde(default = "default_n_samples")]
        n_samples: usize,
        #[serde(default = "default_attenuation")]
        attenuation: f64,
        #[serde(default = "default_random_cutoff")]
        cutoff: f64,
        #[serde(default = "default_sigma")]
        sigma: f64,
        #[serde(default)]
        seed: u64,
    },
    RandomHPFilter {
        #[serde(default = "default_n_samples")]
        n_samples: usize,
        #[serde(default = "default_attenuation")]
        attenuation: f64,
        #[serde(default = "default_random_cutoff")]
        cutoff: f64,
        #[serde(default = "default_sigma")]
        sigma: f64,
        #[serde(default)]
        seed: u64,
    },
    RandomBPFilter {
        #[serde(default = "default_n_samples")]
        n_samples: usize,
        #[serde(default = "default_attenuation")]
        attenuation: f64,
        #[serde(default = "default_cutoff_low")]
        cutoff_low: f64,
        #[serde(default = "default_random_cutoff")]
        cutoff_high: f64,
        #[serde(default = "default_sigma")]
        sigma: f64,
        #[serde(default)]
        seed: u64,
    },
}

impl Default for DeformerConfig {
    fn default() -> Self {
        DeformerConfig::Filter {
            btype: default_btype(),
            attenuation: default_attenuation(),
            cutoff: CutoffSpec::default(),
        }
    }
}

impl DeformerConfig {
    /// Construct the described deformer, validating its parameters
    pub fn build(&self) -> Result<Box<dyn FilterDeformer>> {
        let deformer: Box<dyn FilterDeformer> = match self {
            DeformerConfig::Filter {
                btype,
                attenuation,
                cutoff,
            } => Box::new(Filter::new(*btype, *attenuation, cutoff.resolve(*btype)?)?),
            DeformerConfig::RandomLPFilter {
                n_samples,
                attenuation,
                cutoff,
                sigma,
                seed,
            } => Box::new(RandomLPFilter::new(*n_samples, *attenuation, *cutoff, *sigma, *seed)?),
            DeformerConfig::RandomHPFilter {
                n_samples,
                attenuation,
                cutoff,
                sigma,
                seed,
            } => Box::new(RandomHPFilter::new(*n_samples, *attenuation, *cutoff, *sigma, *seed)?),
            DeformerConfig::RandomBPFilter {
                n_samples,
                attenuation,
                cutoff_low,
                cutoff_high,
                sigma,
                seed,
            } => Box::new(RandomBPFilter::new(
                *n_samples,
                *attenuation,
                *cutoff_low,
                *cutoff_high,
                *sigma,
                *seed,
            )?),
        };
        Ok(deformer)
    }

    /// Name of the deformer type
    pub fn name(&self) -> &'static str {
        match self {
            DeformerConfig::Filter { .. } => "Filter",
            DeformerConfig::RandomLPFilter { .. } => "RandomLPFilter",
            DeformerConfig::RandomHPFilter { .. } => "RandomHPFilter",
            DeformerConfig::RandomBPFilter { .. } => "RandomBPFilter",
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }
}
