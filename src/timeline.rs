//! Normalises a note list into instants and hitsound cues.
//!
//! A tap contributes one instant. A hold contributes two: its start, paired with
//! the start cue and the sustain loop, and its end, paired with the end cue.
//! Instants without a cue still count as positions other charts can be matched
//! against. An empty `sounds` object is not a cue.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    hitsound::Matcher,
    model::{HitsoundCue, HoldLoop, Millis, Note, SoundFlags, Sounds},
};

/// A hitsound at one instant, with defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Sample bank.
    pub sample_set: String,
    /// Additive samples.
    pub sounds: Sounds,
    /// Volume from 0 to 100.
    pub volume: u8,
    /// Sustain loop, only ever present on a hold start.
    pub hold_loop: Option<HoldLoop>,
}

impl Cue {
    fn from_edge(
        edge: &HitsoundCue,
        sample_set: &str,
        hold_loop: Option<&HoldLoop>,
    ) -> Option<Self> {
        let sounds = edge.sounds.as_ref().filter(|sounds| !sounds.is_empty())?.clone();
        Some(Self {
            sample_set: sample_set.to_owned(),
            sounds,
            volume: edge.volume_or_default(),
            hold_loop: hold_loop.filter(|hold_loop| !hold_loop.is_empty()).cloned(),
        })
    }

    /// The additive flags of this cue.
    #[must_use]
    pub const fn flags(&self) -> SoundFlags {
        self.sounds.flags()
    }
}

/// Instants and cues of one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    instants: BTreeSet<Millis>,
    cues: BTreeMap<Millis, Cue>,
    audible: BTreeMap<Millis, SoundFlags>,
}

impl Timeline {
    /// Extracts the timeline of `notes`.
    ///
    /// When several notes carry a cue at the same instant, the first one in
    /// chart order is kept. Audible flags keep the first audible cue instead,
    /// so a silent key of a chord never hides a clap on another key.
    #[must_use]
    pub fn extract(notes: &[Note]) -> Self {
        let mut timeline = Self::default();
        for note in notes {
            match note {
                Note::Tap(tap) => {
                    let cue = tap.hitsound.as_ref().and_then(|hitsound| {
                        Cue::from_edge(hitsound, hitsound.sample_set_or_default(), None)
                    });
                    timeline.push(tap.time, cue);
                }
                Note::Hold(hold) => {
                    let (start, end) = hold.hitsound.as_ref().map_or((None, None), |hitsound| {
                        let sample_set = hitsound.sample_set_or_default();
                        let start = hitsound.start.as_ref().and_then(|edge| {
                            Cue::from_edge(edge, sample_set, hitsound.hold_loop.as_ref())
                        });
                        let end = hitsound
                            .end
                            .as_ref()
                            .and_then(|edge| Cue::from_edge(edge, sample_set, None));
                        (start, end)
                    });
                    timeline.push(hold.start_time, start);
                    timeline.push(hold.end_time, end);
                }
            }
        }
        timeline
    }

    fn push(&mut self, at: Millis, cue: Option<Cue>) {
        self.instants.insert(at);
        let Some(cue) = cue else {
            return;
        };
        let flags = cue.flags();
        if !flags.is_silent() {
            self.audible.entry(at).or_insert(flags);
        }
        self.cues.entry(at).or_insert(cue);
    }

    /// Every note instant, ascending.
    #[must_use]
    pub const fn instants(&self) -> &BTreeSet<Millis> {
        &self.instants
    }

    /// Instants carrying a cue, ascending.
    #[must_use]
    pub const fn cues(&self) -> &BTreeMap<Millis, Cue> {
        &self.cues
    }

    /// The earliest instant.
    #[must_use]
    pub fn first(&self) -> Option<Millis> {
        self.instants.first().copied()
    }

    /// The latest instant.
    #[must_use]
    pub fn last(&self) -> Option<Millis> {
        self.instants.last().copied()
    }

    /// The cue nearest to `at` within the matcher's tolerance.
    #[must_use]
    pub fn cue_near(&self, at: Millis, matcher: &Matcher) -> Option<(Millis, &Cue)> {
        matcher.nearest_in_map(&self.cues, at)
    }

    /// The note instant nearest to `at` within the matcher's tolerance.
    #[must_use]
    pub fn instant_near(&self, at: Millis, matcher: &Matcher) -> Option<Millis> {
        matcher.nearest_in_set(&self.instants, at)
    }

    /// The flags of the first audible cue at each instant.
    #[must_use]
    pub const fn audible_flags(&self) -> &BTreeMap<Millis, SoundFlags> {
        &self.audible
    }
}
