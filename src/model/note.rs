//! Notes and the hitsound cues attached to them.
//!
//! In the chart JSON a note is a dictionary tagged by `"type"`. It is resolved
//! once into the closed [`Note`] enum here, so downstream code matches on
//! variants instead of comparing type strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Millis;

/// A single playable event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Note {
    /// An instantaneous key press.
    Tap(TapNote),
    /// A key held from `start_time` to `end_time`.
    Hold(HoldNote),
}

impl Note {
    /// The instant the note begins.
    #[must_use]
    pub const fn start(&self) -> Millis {
        match self {
            Self::Tap(tap) => tap.time,
            Self::Hold(hold) => hold.start_time,
        }
    }

    /// The instant the note ends. Same as [`Note::start`] for taps.
    #[must_use]
    pub const fn end(&self) -> Millis {
        match self {
            Self::Tap(tap) => tap.time,
            Self::Hold(hold) => hold.end_time,
        }
    }

    /// Whether the note is being played at `at`, boundaries included.
    #[must_use]
    pub fn is_active_at(&self, at: Millis) -> bool {
        match self {
            Self::Tap(tap) => tap.time == at,
            Self::Hold(hold) => hold.start_time <= at && at <= hold.end_time,
        }
    }
}

/// Tap note payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TapNote {
    /// When the key must be pressed.
    pub time: Millis,
    /// The hitsound played on press.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hitsound: Option<HitsoundCue>,
    /// Keys not modelled above, such as the key the note is bound to.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hold note payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldNote {
    /// When the key must be pressed.
    pub start_time: Millis,
    /// When the key must be released. Never before `start_time`.
    pub end_time: Millis,
    /// Hitsounds for press, release and sustain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hitsound: Option<HoldHitsoundCue>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Additive hitsound flags. A missing flag is off.
///
/// Flags are optional so that an empty `sounds` object stays distinguishable
/// from one that switches every flag off explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sounds {
    /// Clap sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hitclap: Option<bool>,
    /// Whistle sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hitwhistle: Option<bool>,
    /// Finish sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hitfinish: Option<bool>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sounds {
    /// Sounds with every flag written out.
    #[must_use]
    pub fn from_flags(flags: SoundFlags) -> Self {
        Self {
            hitclap: Some(flags.clap),
            hitwhistle: Some(flags.whistle),
            hitfinish: Some(flags.finish),
            extra: Map::new(),
        }
    }

    /// Reduces the cue to its three flags.
    #[must_use]
    pub const fn flags(&self) -> SoundFlags {
        SoundFlags {
            clap: matches!(self.hitclap, Some(true)),
            whistle: matches!(self.hitwhistle, Some(true)),
            finish: matches!(self.hitfinish, Some(true)),
        }
    }

    /// Whether the object had no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hitclap.is_none()
            && self.hitwhistle.is_none()
            && self.hitfinish.is_none()
            && self.extra.is_empty()
    }
}

/// The three additive flags of [`Sounds`], comparable across charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SoundFlags {
    /// Clap sample.
    pub clap: bool,
    /// Whistle sample.
    pub whistle: bool,
    /// Finish sample.
    pub finish: bool,
}

impl SoundFlags {
    /// Whether no additive sample plays.
    #[must_use]
    pub const fn is_silent(self) -> bool {
        !(self.clap || self.whistle || self.finish)
    }
}

/// A hitsound played at one instant: a tap, or one edge of a hold.
///
/// Hold edges leave `sample_set` empty; the sample set of a hold lives on the
/// enclosing [`HoldHitsoundCue`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HitsoundCue {
    /// Sample bank, `"normal"` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_set: Option<String>,
    /// Additive samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sounds: Option<Sounds>,
    /// Volume from 0 to 100, `100` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HitsoundCue {
    /// Sample bank used when a cue names none.
    pub const DEFAULT_SAMPLE_SET: &'static str = "normal";
    /// Volume used when a cue names none.
    pub const DEFAULT_VOLUME: u8 = 100;

    /// The sample bank with the default applied.
    #[must_use]
    pub fn sample_set_or_default(&self) -> &str {
        self.sample_set
            .as_deref()
            .unwrap_or(Self::DEFAULT_SAMPLE_SET)
    }

    /// The volume with the default applied.
    #[must_use]
    pub fn volume_or_default(&self) -> u8 {
        self.volume.unwrap_or(Self::DEFAULT_VOLUME)
    }
}

/// Hitsounds of a hold note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoldHitsoundCue {
    /// Sample bank for both edges, `"normal"` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_set: Option<String>,
    /// Cue on press.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<HitsoundCue>,
    /// Cue on release.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<HitsoundCue>,
    /// Sample looped while the key is held.
    #[serde(rename = "hold", skip_serializing_if = "Option::is_none")]
    pub hold_loop: Option<HoldLoop>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HoldHitsoundCue {
    /// The sample bank with the default applied.
    #[must_use]
    pub fn sample_set_or_default(&self) -> &str {
        self.sample_set
            .as_deref()
            .unwrap_or(HitsoundCue::DEFAULT_SAMPLE_SET)
    }
}

/// The sustain loop of a hold. It has a volume but no additive sounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldLoop {
    /// Loop volume from 0 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HoldLoop {
    /// Whether the loop carries no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.extra.is_empty()
    }
}
