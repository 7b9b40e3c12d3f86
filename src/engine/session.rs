//! Session: audio plus the annotations that describe it

use super::AudioBuffer;
use crate::annotation::Annotation;
use crate::deform::{DeformerConfig, FilterState};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One applied deformation, recorded on the output session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Deformer that produced the state
    pub deformer: DeformerConfig,
    /// State that was applied
    pub state: FilterState,
}

/// Audio with its annotations and deformation history
#[derive(Debug, Clone)]
pub struct Session {
    /// Audio samples and sample rate
    pub audio: AudioBuffer,
    /// Annotations, in insertion order
    pub annotations: Vec<Annotation>,
    history: Vec<HistoryEntry>,
}

impl Session {
    /// Create a session with no annotations
    pub fn new(audio: AudioBuffer) -> Self {
        Self {
            audio,
            annotations: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Builder-style annotation attach
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Sample rate of the session audio
    pub fn sample_rate(&self) -> f64 {
        self.audio.sample_rate()
    }

    /// First annotation in the given namespace
    pub fn annotation(&self, namespace: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.namespace == namespace)
    }

    /// Deformations applied to produce this session, oldest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub(crate) fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Serialize the deformation history to JSON
    pub fn history_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.history)?)
    }
}
