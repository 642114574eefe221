//! Copies hitsounds from one difficulty into every other difficulty.
//!
//! Each note of a target difficulty is matched against the source timeline at
//! its instant (a hold is matched separately at its start and end). On a match
//! the target adopts the source's sample set and sounds. Source notes whose
//! `sounds` object is absent or empty carry no cue and change nothing. Volumes follow the
//! source unless the caller asks to keep the target's own.

use log::debug;

use crate::{
    archive::{decode, encode},
    config::Config,
    model::{BeatmapArchive, HitsoundCue, HoldLoop, Note},
    timeline::{Cue, Timeline},
};

use super::{Matcher, ReconcileError};

/// Which existing values of the targets survive a copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CopyOptions {
    /// Keep the volumes of taps and hold edges.
    pub preserve_tap_volume: bool,
    /// Keep the sustain loop volume of holds.
    pub preserve_hold_volume: bool,
}

/// Summary of a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyStats {
    /// Number of note sides (a tap, a hold start or a hold end) that adopted a cue.
    pub modified_notes: usize,
    /// Number of difficulties the source was copied into.
    pub target_difficulties: usize,
    /// Display name of the resolved source difficulty.
    pub source_name: String,
}

/// Output of [`reconcile_copy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutput {
    /// The rewritten archive.
    pub bytes: Vec<u8>,
    /// What was changed.
    pub stats: CopyStats,
}

/// Decodes `bytes`, copies the hitsounds of `source_name` and encodes the result.
///
/// # Errors
///
/// Fails when the archive cannot be decoded, plus every case of [`reconcile_copy`].
pub fn copy_hitsounds(
    bytes: &[u8],
    source_name: &str,
    options: CopyOptions,
    config: &Config,
) -> Result<CopyOutput, ReconcileError> {
    let archive = decode(bytes, &config.limits)?;
    reconcile_copy(archive, source_name, options, config)
}

/// Copies the hitsounds of `source_name` into every other difficulty and encodes the archive.
///
/// # Errors
///
/// - [`ReconcileError::MissingMetadata`] when the archive has no `meta.json`.
/// - [`ReconcileError::SourceNotFound`] when no difficulty is named `source_name`.
/// - [`ReconcileError::Encode`] when the rewritten archive cannot be written.
pub fn reconcile_copy(
    mut archive: BeatmapArchive,
    source_name: &str,
    options: CopyOptions,
    config: &Config,
) -> Result<CopyOutput, ReconcileError> {
    archive.require_metadata()?;
    let stats = apply_copy(&mut archive, source_name, options, config)?;
    let bytes = encode(&archive)?;
    Ok(CopyOutput { bytes, stats })
}

/// Copies the hitsounds of `source_name` into every other difficulty of the model.
///
/// The archive is left untouched when the source cannot be found.
///
/// # Errors
///
/// Returns [`ReconcileError::SourceNotFound`] when no difficulty is named `source_name`,
/// ignoring case.
pub fn apply_copy(
    archive: &mut BeatmapArchive,
    source_name: &str,
    options: CopyOptions,
    config: &Config,
) -> Result<CopyStats, ReconcileError> {
    let found = archive.find_difficulty(source_name).and_then(|index| {
        let difficulty = archive.difficulties.get(index)?;
        Some((index, difficulty))
    });
    let Some((source_index, difficulty)) = found else {
        return Err(ReconcileError::SourceNotFound {
            requested: source_name.to_owned(),
            available: archive.difficulty_names(),
        });
    };
    let source = Timeline::extract(&difficulty.notes);
    let resolved_name = difficulty.display_name.clone();

    let matcher = Matcher::from_config(config);
    let mut modified_notes = 0;
    let mut target_difficulties = 0;
    for (index, target) in archive.difficulties.iter_mut().enumerate() {
        if index == source_index {
            continue;
        }
        target_difficulties += 1;
        let modified: usize = target
            .notes
            .iter_mut()
            .map(|note| adopt_note(note, &source, &matcher, options))
            .sum();
        debug!("copied {modified} hitsounds into '{}'", target.label());
        modified_notes += modified;
    }

    Ok(CopyStats {
        modified_notes,
        target_difficulties,
        source_name: resolved_name,
    })
}

/// Applies matching source cues to one note, returning how many sides changed.
fn adopt_note(
    note: &mut Note,
    source: &Timeline,
    matcher: &Matcher,
    options: CopyOptions,
) -> usize {
    match note {
        Note::Tap(tap) => {
            let Some((_, cue)) = source.cue_near(tap.time, matcher) else {
                return 0;
            };
            let target = tap.hitsound.get_or_insert_with(HitsoundCue::default);
            target.sample_set = Some(cue.sample_set.clone());
            adopt_edge(target, cue, options.preserve_tap_volume);
            1
        }
        Note::Hold(hold) => {
            let start = source.cue_near(hold.start_time, matcher);
            let end = source.cue_near(hold.end_time, matcher);
            if start.is_none() && end.is_none() {
                return 0;
            }
            let target = hold.hitsound.get_or_insert_with(Default::default);
            let mut modified = 0;
            if let Some((_, cue)) = start {
                target.sample_set = Some(cue.sample_set.clone());
                adopt_edge(
                    target.start.get_or_insert_with(HitsoundCue::default),
                    cue,
                    options.preserve_tap_volume,
                );
                if let Some(source_loop) = &cue.hold_loop {
                    adopt_hold_loop(
                        &mut target.hold_loop,
                        source_loop,
                        options.preserve_hold_volume,
                    );
                }
                modified += 1;
            }
            if let Some((_, cue)) = end {
                target.sample_set = Some(cue.sample_set.clone());
                adopt_edge(
                    target.end.get_or_insert_with(HitsoundCue::default),
                    cue,
                    options.preserve_tap_volume,
                );
                modified += 1;
            }
            modified
        }
    }
}

fn adopt_edge(target: &mut HitsoundCue, cue: &Cue, preserve_volume: bool) {
    target.sounds = Some(cue.sounds.clone());
    if !preserve_volume {
        target.volume = Some(cue.volume);
    }
}

/// A preserved loop keeps the target's loop only when it has a volume; it never
/// takes fields from the source.
fn adopt_hold_loop(target: &mut Option<HoldLoop>, source: &HoldLoop, preserve_volume: bool) {
    if !preserve_volume {
        *target = Some(source.clone());
    } else if target.as_ref().is_none_or(|hold_loop| hold_loop.volume.is_none()) {
        *target = None;
    }
}
