//! Reports instants where two difficulties play different hitsounds.
//!
//! Every audible cue of one difficulty is checked against the other difficulty
//! when the other has a note within tolerance. Only the clap, whistle and
//! finish flags are compared: volume and sample set are stylistic and allowed
//! to differ between difficulties.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::{
    config::Config,
    format::format_timestamp,
    model::{BeatmapArchive, Millis},
    timeline::Timeline,
};

use super::Matcher;

/// File name of the rendered report attachment.
pub const ATTACHMENT_NAME: &str = "hitsound_differences.txt";

/// Timestamps per line in the rendered report.
const TIMESTAMPS_PER_LINE: usize = 10;

/// A pair of difficulties with inconsistent hitsounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// Label of the earlier difficulty in archive order.
    pub first: String,
    /// Label of the later difficulty in archive order.
    pub second: String,
    /// Mismatched instants, ascending.
    pub instants: Vec<Millis>,
}

impl DiffEntry {
    /// Renders the entry as a header line followed by the timestamps, ten per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Hitsound differences between '{}' and '{}' ({} total):",
            self.first,
            self.second,
            self.instants.len()
        )];
        lines.extend(
            self.instants
                .chunks(TIMESTAMPS_PER_LINE)
                .map(|chunk| chunk.iter().copied().map(format_timestamp).join(", ")),
        );
        lines.join("\n")
    }
}

/// Every inconsistent pair of a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Inconsistent pairs in archive order.
    pub entries: Vec<DiffEntry>,
}

impl DiffReport {
    /// Whether every pair is consistent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders every entry, each followed by a blank line.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\n", entry.render()))
            .join("\n")
    }

    /// The rendered report as an attachment `(file name, contents)`, or `None` when empty.
    #[must_use]
    pub fn attachment(&self) -> Option<(String, String)> {
        (!self.is_empty()).then(|| (ATTACHMENT_NAME.to_owned(), self.render()))
    }
}

struct Side<'a> {
    label: &'a str,
    timeline: Timeline,
}

/// Compares the hitsounds of every pair of difficulties.
///
/// Maps with fewer than two difficulties are trivially consistent.
#[must_use]
pub fn reconcile_diff(archive: &BeatmapArchive, config: &Config) -> DiffReport {
    if archive.difficulties.len() < 2 {
        return DiffReport::default();
    }
    let matcher = Matcher::from_config(config);
    let sides: Vec<Side<'_>> = archive
        .difficulties
        .iter()
        .map(|difficulty| Side {
            label: difficulty.label(),
            timeline: Timeline::extract(&difficulty.notes),
        })
        .collect();

    let entries = sides
        .iter()
        .tuple_combinations()
        .filter_map(|(first, second)| {
            let mut mismatched = BTreeSet::new();
            collect_mismatches(first, second, &matcher, &mut mismatched);
            collect_mismatches(second, first, &matcher, &mut mismatched);
            (!mismatched.is_empty()).then(|| DiffEntry {
                first: first.label.to_owned(),
                second: second.label.to_owned(),
                instants: mismatched.into_iter().collect(),
            })
        })
        .collect();
    DiffReport { entries }
}

/// Records each audible cue of `this` whose instant `other` also plays but with other flags.
fn collect_mismatches(
    this: &Side<'_>,
    other: &Side<'_>,
    matcher: &Matcher,
    out: &mut BTreeSet<Millis>,
) {
    for (&at, &flags) in this.timeline.audible_flags() {
        if other.timeline.instant_near(at, matcher).is_none() {
            continue;
        }
        let counterpart = matcher
            .nearest_in_map(other.timeline.audible_flags(), at)
            .map(|(_, &flags)| flags);
        if counterpart != Some(flags) {
            out.insert(at);
        }
    }
}
