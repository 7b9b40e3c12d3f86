//! Audio Engine Module
//!
//! Audio buffer and session types consumed by the deformers.

pub mod buffer;
pub mod session;

pub use buffer::AudioBuffer;
pub use session::{HistoryEntry, Session};
