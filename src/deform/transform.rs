//! Per-variant driver: states in, deformed sessions out

use super::{apply_annotation, apply_audio, DeformerConfig, FilterDeformer, FilterState};
use crate::engine::{HistoryEntry, Session};
use crate::error::Result;
use log::debug;

/// Apply one state to a copy of `session`
///
/// The audio is filtered, every annotation goes through its adapter and the
/// state is appended to the copy's history. The input session is never
/// modified.
pub fn apply_state(
    session: &Session,
    state: &FilterState,
    config: &DeformerConfig,
) -> Result<Session> {
    let mut variant = session.clone();
    apply_audio(&mut variant.audio, state)?;
    for annotation in variant.annotations.iter_mut() {
        apply_annotation(annotation, state)?;
    }
    variant.record(HistoryEntry {
        deformer: config.clone(),
        state: *state,
    });
    debug!(
        "{} variant {} applied ({} annotations)",
        config.name(),
        variant.history().len(),
        variant.annotations.len()
    );
    Ok(variant)
}

/// Lazily deform `session` once per state the deformer generates
///
/// Each item is an independent copy. A failing variant yields its error;
/// generation itself stops after its first error.
pub fn transform<'a, D>(
    deformer: &'a mut D,
    session: &'a Session,
) -> impl Iterator<Item = Result<Session>> + 'a
where
    D: FilterDeformer + ?Sized,
{
    let config = deformer.config();
    deformer
        .states(session)
        .map(move |state| state.and_then(|state| apply_state(session, &state, &config)))
}
