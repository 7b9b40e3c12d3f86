//! Passband - Filter Deformations for Pitch-Annotated Audio
//!
//! Passband generates band-limited variants of annotated recordings for data
//! augmentation. Each variant pairs a Chebyshev type II filter with the
//! matching edit of the pitch annotations:
//! 1. Audio - zero-phase filtering of every channel
//! 2. Annotations - pitched observations outside the passband are dropped
//!    (or unvoiced, for contours)
//!
//! # Architecture
//!
//! - `dsp`: filter order estimation, Chebyshev II design, second-order
//!   section filtering
//! - `deform`: state generators, audio/annotation application, the
//!   per-variant driver
//! - `engine`: audio buffers and sessions
//! - `annotation` / `pitch`: observation containers and pitch conversions

pub mod annotation;
pub mod deform;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod pitch;

pub use error::{DeformError, Result};
