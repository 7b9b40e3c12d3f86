//! DSP Library
//!
//! Chebyshev type II filter design and zero-phase second-order-section
//! filtering used by the filter deformers.

mod design;
mod sos;

pub use design::{cheb2ord, cheby2, BandType, Cutoff};
pub use sos::{padlen, sosfilt, sosfilt_zi, sosfiltfilt, SosSection};
