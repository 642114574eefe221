//! Types for the map listing service.
//!
//! Maps are published at `https://rhythmtyper.net/beatmap/<id>` and their
//! archives are served from a storage bucket. This module only knows how to
//! derive those addresses and how to read the service's metadata JSON; fetching
//! is left to the caller.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const BEATMAP_PAGE_MARKER: &str = "rhythmtyper.net/beatmap/";
const ARCHIVE_BUCKET: &str =
    "https://storage.googleapis.com/rhythm-typer.firebasestorage.app/beatmaps";

/// Extracts the map id from a map page URL.
///
/// ```
/// use rtm_rs::online::beatmap_id_from_url;
///
/// assert_eq!(beatmap_id_from_url("https://rhythmtyper.net/beatmap/Ab12cd?x=1"), Some("Ab12cd"));
/// assert_eq!(beatmap_id_from_url("https://example.com/beatmap/Ab12cd"), None);
/// ```
#[must_use]
pub fn beatmap_id_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once(BEATMAP_PAGE_MARKER)?;
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    rest.get(..end).filter(|id| !id.is_empty())
}

/// Where the archive of map `id` can be downloaded.
#[must_use]
pub fn archive_url(id: &str) -> String {
    format!("{ARCHIVE_BUCKET}/{id}/{id}.rtm")
}

/// The metadata document could not be read.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OnlineError {
    /// The document is not the expected JSON.
    #[error("malformed beatmap metadata at `{path}`")]
    Malformed {
        /// Path of the offending value inside the document.
        path: String,
        /// The underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Parses the metadata document served for a map id.
///
/// # Errors
///
/// Returns [`OnlineError::Malformed`] when the document does not have the expected shape.
pub fn parse_online_metadata(json: &str) -> Result<OnlineMetadata, OnlineError> {
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(deserializer).map_err(|error| OnlineError::Malformed {
        path: error.path().to_string(),
        source: error.into_inner(),
    })
}

/// The metadata document for one map id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineMetadata {
    /// Matching maps. The first one is the map asked for.
    pub beatmaps: Vec<OnlineBeatmap>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OnlineMetadata {
    /// The map asked for, when the service found one.
    #[must_use]
    pub fn primary(&self) -> Option<&OnlineBeatmap> {
        self.beatmaps.first()
    }
}

/// A second based timestamp as written by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTimestamp {
    /// Seconds since the Unix epoch.
    #[serde(rename = "_seconds")]
    pub seconds: i64,
    /// Sub-second part.
    #[serde(rename = "_nanoseconds", default)]
    pub nanoseconds: u32,
}

/// A published map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OnlineBeatmap {
    /// Title of the song.
    pub song_name: String,
    /// Artist of the song.
    pub artist_name: String,
    /// Creator of the map.
    pub mapper: String,
    /// Tempo.
    pub bpm: f64,
    /// Publication status, for example `ranked`.
    pub status: String,
    /// ISO 8601 date of ranking, for ranked maps.
    pub ranked_date: Option<String>,
    /// Last modification.
    pub last_updated_at: Option<ServiceTimestamp>,
    /// Number of plays.
    pub play_count: u64,
    /// Thumbnail address.
    pub background_image_url: Option<String>,
    /// Charts in service order.
    pub difficulties: Vec<OnlineDifficulty>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OnlineBeatmap {
    /// Whether the map is ranked.
    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.status.eq_ignore_ascii_case("ranked")
    }

    /// Length in seconds of the first chart, the one shown as the map length.
    #[must_use]
    pub fn length_seconds(&self) -> Option<f64> {
        self.difficulties.first().map(|difficulty| difficulty.length)
    }

    /// Charts from the highest star rating down.
    #[must_use]
    pub fn difficulties_by_star_rating(&self) -> Vec<&OnlineDifficulty> {
        let mut sorted: Vec<_> = self.difficulties.iter().collect();
        sorted.sort_by(|a, b| {
            b.star_rating
                .partial_cmp(&a.star_rating)
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }
}

/// Summary of one published chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OnlineDifficulty {
    /// Display name.
    pub name: String,
    /// Computed difficulty rating.
    pub star_rating: f64,
    /// Judgement strictness.
    pub overall_difficulty: f64,
    /// Length in seconds.
    pub length: f64,
    /// Number of taps.
    pub note_count: u64,
    /// Number of holds.
    pub hold_count: u64,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OnlineDifficulty {
    /// Taps and holds together.
    #[must_use]
    pub const fn object_count(&self) -> u64 {
        self.note_count + self.hold_count
    }
}
