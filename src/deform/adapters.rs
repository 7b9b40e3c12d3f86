//! Annotation adapters
//!
//! One adapter per annotation kind. Each adapter builds the replacement
//! observations first, then clears the annotation and appends them, so a
//! malformed observation leaves the annotation untouched. Timing and
//! confidence always pass through unchanged.

use super::{classify, FilterState};
use crate::annotation::{Annotation, AnnotationKind, Observation, ObservationValue};
use crate::error::{DeformError, Result};
use crate::pitch::{Pitch, PitchClass};
use log::warn;

/// Route an annotation to the adapter for its namespace
///
/// Namespaces without an adapter are left untouched.
pub fn apply_annotation(annotation: &mut Annotation, state: &FilterState) -> Result<()> {
    match adapter_kind(annotation) {
        Ok(AnnotationKind::Contour) => filter_contour(annotation, state),
        Ok(AnnotationKind::Hz) => filter_hz(annotation, state),
        Ok(AnnotationKind::Midi) => filter_midi(annotation, state),
        Ok(AnnotationKind::PitchClass) => filter_class(annotation, state),
        Err(e) => {
            warn!("{}, leaving it unchanged", e);
            Ok(())
        }
    }
}

/// Adapter family for an annotation, or `UnknownNamespace`
pub fn adapter_kind(annotation: &Annotation) -> Result<AnnotationKind> {
    annotation
        .kind()
        .ok_or_else(|| DeformError::UnknownNamespace {
            namespace: annotation.namespace.clone(),
        })
}

fn mismatch(namespace: &str, kind: AnnotationKind) -> DeformError {
    DeformError::ValueMismatch {
        namespace: namespace.to_string(),
        expected: kind.value_shape(),
    }
}

fn rewrite<F>(annotation: &mut Annotation, mut rewrite_one: F) -> Result<()>
where
    F: FnMut(&Observation) -> Result<Option<Observation>>,
{
    let replacements = annotation
        .data()
        .iter()
        .filter_map(|obs| rewrite_one(obs).transpose())
        .collect::<Result<Vec<_>>>()?;

    annotation.pop_data();
    for obs in replacements {
        annotation.append(obs);
    }
    Ok(())
}

/// Pitch contour: every frame is kept; out-of-band frames become unvoiced
/// with no frequency
pub fn filter_contour(annotation: &mut Annotation, state: &FilterState) -> Result<()> {
    let namespace = annotation.namespace.clone();
    rewrite(annotation, |obs| match obs.value {
        ObservationValue::Contour {
            index, frequency, ..
        } => {
            let kept = frequency.and_then(|hz| classify(Pitch::Hz(hz), state));
            let frequency = match kept {
                Some(Pitch::Hz(hz)) => Some(hz),
                _ => None,
            };
            Ok(Some(obs.with_value(ObservationValue::Contour {
                index,
                frequency,
                voiced: frequency.is_some(),
            })))
        }
        _ => Err(mismatch(&namespace, AnnotationKind::Contour)),
    })
}

/// Frequency in Hz: out-of-band observations are dropped
pub fn filter_hz(annotation: &mut Annotation, state: &FilterState) -> Result<()> {
    filter_scalar(annotation, state, AnnotationKind::Hz, Pitch::Hz)
}

/// MIDI number: out-of-band observations are dropped
pub fn filter_midi(annotation: &mut Annotation, state: &FilterState) -> Result<()> {
    filter_scalar(annotation, state, AnnotationKind::Midi, Pitch::Midi)
}

fn filter_scalar(
    annotation: &mut Annotation,
    state: &FilterState,
    kind: AnnotationKind,
    unit: fn(f64) -> Pitch,
) -> Result<()> {
    let namespace = annotation.namespace.clone();
    rewrite(annotation, |obs| match obs.value {
        ObservationValue::Scalar(value) => Ok(classify(unit(value), state)
            .map(|_| obs.with_value(ObservationValue::Scalar(value)))),
        _ => Err(mismatch(&namespace, kind)),
    })
}

/// Pitch class: out-of-band observations are dropped
///
/// Tonic and octave are parsed into a [`PitchClass`] and written back from
/// it, so any octave round-trips. Spellings are normalized to an upper-case
/// letter followed by `#` or `b` marks.
pub fn filter_class(annotation: &mut Annotation, state: &FilterState) -> Result<()> {
    let namespace = annotation.namespace.clone();
    rewrite(annotation, |obs| match &obs.value {
        ObservationValue::PitchClass { tonic, pitch } => {
            let class = PitchClass::from_tonic(tonic, *pitch)?;
            Ok(match classify(Pitch::PitchClass(class), state) {
                Some(Pitch::PitchClass(kept)) => {
                    Some(obs.with_value(ObservationValue::PitchClass {
                        tonic: kept.tonic(),
                        pitch: kept.octave,
                    }))
                }
                _ => None,
            })
        }
        _ => Err(mismatch(&namespace, AnnotationKind::PitchClass)),
    })
}
