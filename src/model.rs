//! The decoded, in-memory representation of an RTM map.
//!
//! A [`BeatmapArchive`] is built once per [`crate::archive::decode`] call. Analyses
//! only borrow it; the hitsound copier is the single component that mutates
//! difficulties in place before the archive is encoded again.
//!
//! Every JSON record keeps the keys it does not understand in an `extra` map,
//! so decoding and re-encoding an unmodified entry never drops data.

pub mod note;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use self::note::{
    HitsoundCue, HoldHitsoundCue, HoldLoop, HoldNote, Note, SoundFlags, Sounds, TapNote,
};

/// A point on the chart timeline, in milliseconds from the start of the song.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    /// The start of the song.
    pub const ZERO: Self = Self(0);

    /// Calculates an absolute difference of two instants.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Moves the instant backwards, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Moves the instant forwards, stopping at [`u64::MAX`].
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Converts into fractional seconds.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl From<u64> for Millis {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Millis> for u64 {
    fn from(value: Millis) -> Self {
        value.0
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Contents of `meta.json`.
///
/// Only the fields the verifier reads are typed. Everything else is kept in
/// [`Metadata::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    /// Title of the song.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_name: Option<String>,
    /// Artist of the song.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    /// Creator of the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapper: Option<String>,
    /// Space separated search tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Song preview point in milliseconds. The editor writes `-1` when it is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_time: Option<i64>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// The tags string, empty when absent.
    #[must_use]
    pub fn tags(&self) -> &str {
        self.tags.as_deref().unwrap_or_default()
    }

    /// The preview point, or `None` when it was never set.
    #[must_use]
    pub fn preview_point(&self) -> Option<Millis> {
        self.preview_time
            .and_then(|time| u64::try_from(time).ok())
            .map(Millis)
    }
}

/// A section of lyrics the player types during the chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypingSection {
    /// When typing starts.
    pub start_time: Millis,
    /// When typing must be finished.
    pub end_time: Millis,
    /// The text to type.
    pub text: String,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One playable chart in the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    /// Name of the archive entry this difficulty was decoded from.
    #[serde(skip)]
    pub source_name: String,
    /// The difficulty name shown to players.
    #[serde(default, rename = "name")]
    pub display_name: String,
    /// Judgement strictness. Missing means it was never set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_difficulty: Option<f64>,
    /// Notes in chart order.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Typing sections, when the chart has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_sections: Option<Vec<TypingSection>>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Difficulty {
    /// The display name, or the entry name when the chart has no name.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.source_name
        } else {
            &self.display_name
        }
    }

    /// Number of tap notes.
    #[must_use]
    pub fn tap_count(&self) -> usize {
        self.notes
            .iter()
            .filter(|note| matches!(note, Note::Tap(_)))
            .count()
    }

    /// Number of hold notes.
    #[must_use]
    pub fn hold_count(&self) -> usize {
        self.notes.len() - self.tap_count()
    }

    /// Typing sections, empty when the chart has none.
    #[must_use]
    pub fn typing_sections(&self) -> &[TypingSection] {
        self.typing_sections.as_deref().unwrap_or_default()
    }
}

/// An archive entry the verifier summarises but never parses beyond its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Entry name inside the archive.
    pub name: String,
    /// Decompressed size.
    pub size_bytes: u64,
    pub(crate) data: Vec<u8>,
}

impl AssetDescriptor {
    pub(crate) fn new(name: String, data: Vec<u8>) -> Self {
        Self {
            name,
            size_bytes: data.len() as u64,
            data,
        }
    }

    /// The raw entry bytes, kept so the archive can be written back unchanged.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// The background image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundDescriptor {
    /// The image entry.
    pub asset: AssetDescriptor,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// The song audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDescriptor {
    /// The audio entry.
    pub asset: AssetDescriptor,
    /// Track length, when the container could be read.
    pub duration_seconds: Option<f64>,
    /// Average bitrate in kbps rounded to one decimal, when the length is known and positive.
    pub bitrate_kbps: Option<f64>,
}

/// An entry carried through the archive untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Entry name inside the archive. Names ending in `/` are directory markers.
    pub name: String,
    /// The raw entry bytes.
    pub data: Vec<u8>,
}

impl RawEntry {
    /// Whether this entry only marks a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// The archive has no `meta.json` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("invalid map: missing meta.json")]
pub struct MissingMetadata;

/// A whole decoded map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatmapArchive {
    /// `meta.json`, when present.
    pub metadata: Option<Metadata>,
    /// Difficulties in archive entry order.
    pub difficulties: Vec<Difficulty>,
    /// Background image.
    pub background: Option<BackgroundDescriptor>,
    /// Song audio.
    pub audio: Option<AudioDescriptor>,
    /// Background video.
    pub video: Option<AssetDescriptor>,
    /// Custom hitsound samples under `hitsounds/`.
    pub hitsound_assets: Vec<AssetDescriptor>,
    /// Every other entry, in archive order.
    pub opaque_entries: Vec<RawEntry>,
}

impl BeatmapArchive {
    /// The metadata, failing when the archive had none.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadata`] when `meta.json` was absent.
    pub fn require_metadata(&self) -> Result<&Metadata, MissingMetadata> {
        self.metadata.as_ref().ok_or(MissingMetadata)
    }

    /// Finds a difficulty by its display name, ignoring case.
    #[must_use]
    pub fn find_difficulty(&self, display_name: &str) -> Option<usize> {
        let wanted = display_name.to_lowercase();
        self.difficulties
            .iter()
            .position(|difficulty| difficulty.display_name.to_lowercase() == wanted)
    }

    /// Display names of all difficulties, in archive order.
    #[must_use]
    pub fn difficulty_names(&self) -> Vec<String> {
        self.difficulties
            .iter()
            .map(|difficulty| difficulty.display_name.clone())
            .collect()
    }

    /// All summarised media entries, in the order they are written back.
    pub fn assets(&self) -> impl Iterator<Item = &AssetDescriptor> {
        self.background
            .iter()
            .map(|background| &background.asset)
            .chain(self.audio.iter().map(|audio| &audio.asset))
            .chain(self.video.iter())
            .chain(self.hitsound_assets.iter())
    }
}
