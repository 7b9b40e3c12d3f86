//! Time-aligned pitch annotations
//!
//! An [`Annotation`] is a namespace tag plus an ordered list of
//! [`Observation`]s. Deformations rewrite annotations by taking the existing
//! observations with [`Annotation::pop_data`] and appending replacements.

use serde::{Deserialize, Serialize};

/// Which adapter family an annotation namespace belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// `pitch_contour`: continuous f0 with voicing
    Contour,
    /// `pitch_hz`, `note_hz`: scalar frequency
    Hz,
    /// `pitch_midi`, `note_midi`: scalar MIDI number
    Midi,
    /// `pitch_class`: tonic plus octave
    PitchClass,
}

impl AnnotationKind {
    /// Resolve a namespace name to its kind
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "pitch_contour" => Some(AnnotationKind::Contour),
            "pitch_hz" | "note_hz" => Some(AnnotationKind::Hz),
            "pitch_midi" | "note_midi" => Some(AnnotationKind::Midi),
            "pitch_class" => Some(AnnotationKind::PitchClass),
            _ => None,
        }
    }

    /// Human-readable name of the value shape this kind expects
    pub fn value_shape(&self) -> &'static str {
        match self {
            AnnotationKind::Contour => "contour",
            AnnotationKind::Hz => "hz",
            AnnotationKind::Midi => "midi",
            AnnotationKind::PitchClass => "pitch class",
        }
    }
}

/// Value carried by one observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    /// One frame of a pitch contour
    Contour {
        index: i64,
        frequency: Option<f64>,
        voiced: bool,
    },
    /// Tonic spelling plus octave
    PitchClass { tonic: String, pitch: i32 },
    /// Bare number: Hz or MIDI depending on the namespace
    Scalar(f64),
}

/// A single time-stamped observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Onset in seconds
    pub time: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Confidence, if the annotator provided one
    pub confidence: Option<f64>,
    /// Observation payload
    pub value: ObservationValue,
}

impl Observation {
    /// Create an observation
    pub fn new(time: f64, duration: f64, confidence: Option<f64>, value: ObservationValue) -> Self {
        Self {
            time,
            duration,
            confidence,
            value,
        }
    }

    /// Same timing and confidence, different value
    pub fn with_value(&self, value: ObservationValue) -> Self {
        Self {
            time: self.time,
            duration: self.duration,
            confidence: self.confidence,
            value,
        }
    }
}

/// An annotation: namespace plus observations ordered by time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Namespace, e.g. `pitch_hz`
    pub namespace: String,
    data: Vec<Observation>,
}

impl Annotation {
    /// Create an empty annotation in the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            data: Vec::new(),
        }
    }

    /// Adapter family of this annotation, if any
    pub fn kind(&self) -> Option<AnnotationKind> {
        AnnotationKind::from_namespace(&self.namespace)
    }

    /// Observations in time order
    pub fn data(&self) -> &[Observation] {
        &self.data
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the annotation has no observations
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove and return all observations, leaving the annotation empty
    pub fn pop_data(&mut self) -> Vec<Observation> {
        std::mem::take(&mut self.data)
    }

    /// Append an observation, keeping time order
    pub fn append(&mut self, observation: Observation) {
        let at = self
            .data
            .partition_point(|existing| existing.time <= observation.time);
        self.data.insert(at, observation);
    }

    /// Builder-style append
    pub fn with(mut self, time: f64, duration: f64, value: ObservationValue) -> Self {
        self.append(Observation::new(time, duration, None, value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_namespace() {
        assert_eq!(
            AnnotationKind::from_namespace("pitch_contour"),
            Some(AnnotationKind::Contour)
        );
        assert_eq!(AnnotationKind::from_namespace("note_hz"), Some(AnnotationKind::Hz));
        assert_eq!(
            AnnotationKind::from_namespace("note_midi"),
            Some(AnnotationKind::Midi)
        );
        assert_eq!(
            AnnotationKind::from_namespace("pitch_class"),
            Some(AnnotationKind::PitchClass)
        );
        assert_eq!(AnnotationKind::from_namespace("chord"), None);
    }

    #[test]
    fn test_append_keeps_time_order() {
        let mut ann = Annotation::new("pitch_hz");
        ann.append(Observation::new(1.0, 0.5, None, ObservationValue::Scalar(440.0)));
        ann.append(Observation::new(0.0, 0.5, None, ObservationValue::Scalar(220.0)));
        ann.append(Observation::new(1.0, 0.5, None, ObservationValue::Scalar(880.0)));

        let values: Vec<_> = ann.data().iter().map(|o| o.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                ObservationValue::Scalar(220.0),
                ObservationValue::Scalar(440.0),
                ObservationValue::Scalar(880.0),
            ]
        );
    }

    #[test]
    fn test_pop_data_clears() {
        let mut ann = Annotation::new("pitch_midi").with(0.0, 1.0, ObservationValue::Scalar(60.0));
        let popped = ann.pop_data();
        assert_eq!(popped.len(), 1);
        assert!(ann.is_empty());
    }

    #[test]
    fn test_value_json_shapes() {
        let contour: ObservationValue =
            serde_json::from_str(r#"{"index": 3, "frequency": null, "voiced": false}"#).unwrap();
        assert_eq!(
            contour,
            ObservationValue::Contour {
                index: 3,
                frequency: None,
                voiced: false
            }
        );

        let class: ObservationValue =
            serde_json::from_str(r#"{"tonic": "C#", "pitch": 4}"#).unwrap();
        assert_eq!(
            class,
            ObservationValue::PitchClass {
                tonic: "C#".to_string(),
                pitch: 4
            }
        );

        let scalar: ObservationValue = serde_json::from_str("440.0").unwrap();
        assert_eq!(scalar, ObservationValue::Scalar(440.0));
    }
}
