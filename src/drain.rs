//! Drain time: how long a chart actually keeps the player busy.
//!
//! The span from the first to the last note instant, minus every gap between
//! consecutive instants that is at least [`Config::idle_gap_threshold`] long.
//! Breaks therefore do not count, short pauses do.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::{config::Config, model::Millis, model::Note, timeline::Timeline};

/// Drain time of a note list. Order of `notes` does not matter.
#[must_use]
pub fn drain_time(notes: &[Note], config: &Config) -> Millis {
    drain_time_of(Timeline::extract(notes).instants(), config.idle_gap_threshold)
}

/// Drain time of a set of instants with an explicit idle gap threshold.
#[must_use]
pub fn drain_time_of(instants: &BTreeSet<Millis>, idle_gap: Millis) -> Millis {
    let (Some(&first), Some(&last)) = (instants.first(), instants.last()) else {
        return Millis::ZERO;
    };
    let idle: u64 = instants
        .iter()
        .tuple_windows()
        .map(|(&earlier, &later)| later.abs_diff(earlier))
        .filter(|&gap| gap >= idle_gap.0)
        .sum();
    Millis(last.abs_diff(first).saturating_sub(idle))
}
