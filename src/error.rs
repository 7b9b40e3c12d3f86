//! Error handling for passband deformations
//!
//! Parameter errors are raised when a deformer is constructed; cutoff, order
//! and design errors are raised while states are generated or applied.

use thiserror::Error;

/// Result type alias for passband operations
pub type Result<T> = std::result::Result<T, DeformError>;

/// Main error type for passband operations
#[derive(Error, Debug)]
pub enum DeformError {
    // Construction Errors
    #[error("Invalid parameter: {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Generation Errors
    #[error("Invalid cutoff: {details}")]
    InvalidCutoff { details: String },

    #[error("Filter order estimation failed: {details}")]
    OrderEstimation { details: String },

    // Design / Application Errors
    #[error("Filter design failed: {details}")]
    FilterDesign { details: String },

    #[error(
        "Signal too short for zero-phase filtering: {length} samples (need more than {padlen})"
    )]
    SignalTooShort { length: usize, padlen: usize },

    // Annotation Errors
    #[error("Invalid pitch class: '{token}'")]
    InvalidPitchClass { token: String },

    #[error("Observation value in '{namespace}' does not match expected {expected} value")]
    ValueMismatch {
        namespace: String,
        expected: &'static str,
    },

    #[error("No adapter registered for namespace '{namespace}'")]
    UnknownNamespace { namespace: String },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeformError {
    pub(crate) fn parameter(
        param: &str,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        DeformError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            DeformError::InvalidParameter { .. } => "INVALID_PARAMETER",
            DeformError::InvalidCutoff { .. } => "INVALID_CUTOFF",
            DeformError::OrderEstimation { .. } => "ORDER_ESTIMATION",
            DeformError::FilterDesign { .. } => "FILTER_DESIGN",
            DeformError::SignalTooShort { .. } => "SIGNAL_TOO_SHORT",
            DeformError::InvalidPitchClass { .. } => "INVALID_PITCH_CLASS",
            DeformError::ValueMismatch { .. } => "VALUE_MISMATCH",
            DeformError::UnknownNamespace { .. } => "UNKNOWN_NAMESPACE",
            DeformError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error was raised while constructing a deformer
    ///
    /// Such errors never depend on the session being transformed.
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, DeformError::InvalidParameter { .. })
    }
}
