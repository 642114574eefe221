//! Hitsound reconciliation between difficulties.
//!
//! Charts of one map are expected to play the same hitsounds wherever they
//! place notes at the same time. Two instants are "the same time" when they are
//! within [`crate::Config::hitsound_tolerance`] of each other; the [`Matcher`]
//! resolves a query instant to the nearest candidate inside that window.
//!
//! On top of it:
//!
//! - [`copy`] adopts the cues of one source difficulty into every other one and
//!   writes the archive back.
//! - [`diff`] lists every instant where two difficulties disagree.

pub mod copy;
pub mod diff;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{
    archive::{DecodeError, EncodeError},
    config::Config,
    model::{Millis, MissingMetadata},
};

pub use self::{
    copy::{CopyOptions, CopyOutput, CopyStats, apply_copy, copy_hitsounds, reconcile_copy},
    diff::{DiffEntry, DiffReport, reconcile_diff},
};

/// Nearest-instant lookup within a fixed tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    tolerance: Millis,
}

impl Matcher {
    /// Creates a matcher accepting candidates at most `tolerance` away.
    #[must_use]
    pub const fn new(tolerance: Millis) -> Self {
        Self { tolerance }
    }

    /// Creates a matcher with [`Config::hitsound_tolerance`].
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.hitsound_tolerance)
    }

    /// The accepted distance.
    #[must_use]
    pub const fn tolerance(&self) -> Millis {
        self.tolerance
    }

    /// Finds the event nearest to `query` within tolerance.
    ///
    /// Only a strictly smaller distance replaces the current best, so among
    /// equidistant events the first one yielded wins. Feed events in a fixed
    /// order (ascending instant) for reproducible matches.
    pub fn find_nearest<V>(
        &self,
        events: impl IntoIterator<Item = (Millis, V)>,
        query: Millis,
    ) -> Option<(Millis, V)> {
        let mut best: Option<(u64, Millis, V)> = None;
        for (at, payload) in events {
            let distance = at.abs_diff(query);
            if distance > self.tolerance.0 {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|&(best_distance, _, _)| distance < best_distance)
            {
                best = Some((distance, at, payload));
            }
        }
        best.map(|(_, at, payload)| (at, payload))
    }

    /// [`Matcher::find_nearest`] over a map keyed by instant, visiting only the tolerance window.
    pub fn nearest_in_map<'a, V>(
        &self,
        events: &'a BTreeMap<Millis, V>,
        query: Millis,
    ) -> Option<(Millis, &'a V)> {
        let window = query.saturating_sub(self.tolerance)..=query.saturating_add(self.tolerance);
        self.find_nearest(events.range(window).map(|(&at, payload)| (at, payload)), query)
    }

    /// [`Matcher::find_nearest`] over a set of bare instants.
    #[must_use]
    pub fn nearest_in_set(&self, instants: &BTreeSet<Millis>, query: Millis) -> Option<Millis> {
        let window = query.saturating_sub(self.tolerance)..=query.saturating_add(self.tolerance);
        self.find_nearest(instants.range(window).map(|&at| (at, ())), query)
            .map(|(at, ())| at)
    }
}

/// Failures of the hitsound tools.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No difficulty has the requested display name.
    #[error("difficulty '{requested}' not found. Available difficulties: {}", available.join(", "))]
    SourceNotFound {
        /// The name asked for.
        requested: String,
        /// Display names of every difficulty in the map.
        available: Vec<String>,
    },
    /// The archive has no `meta.json`.
    #[error(transparent)]
    MissingMetadata(#[from] MissingMetadata),
    /// The input archive could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The rewritten archive could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
