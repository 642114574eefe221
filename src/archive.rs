//! The RTM container codec.
//!
//! [`decode`] opens an in-memory zip archive and classifies each entry by name,
//! first match wins:
//!
//! | entry                                   | becomes                              |
//! |-----------------------------------------|--------------------------------------|
//! | `meta.json`                             | [`Metadata`]                         |
//! | any other `*.json`                      | a [`Difficulty`]                     |
//! | `*.jpg`, `*.jpeg`, `*.png`              | the background, with its dimensions  |
//! | `audio.mp3`, `audio.ogg`, `audio.wav`   | the song audio, with its length      |
//! | `*.mp4`, `*.webm`                       | the video                            |
//! | `hitsounds/*` (not a directory)         | a custom hitsound sample             |
//! | anything else                           | an opaque entry, kept byte for byte  |
//!
//! Only the first background, audio and video entry is summarised; later ones,
//! and images whose header cannot be read, are kept as opaque entries.
//!
//! [`encode`] writes the model back: metadata and difficulties as pretty printed
//! JSON, every other entry with its original bytes.

mod media;

use std::{
    collections::HashSet,
    io::{Cursor, Read, Write},
};

use log::{debug, trace};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use zip::{CompressionMethod, ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::{
    config::ArchiveLimits,
    model::{AssetDescriptor, BeatmapArchive, Difficulty, Metadata, Millis, Note, RawEntry},
};

/// Name of the metadata entry.
pub const METADATA_ENTRY: &str = "meta.json";

/// Prefix of custom hitsound samples.
pub const HITSOUND_PREFIX: &str = "hitsounds/";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];
const AUDIO_STEM: &str = "audio";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CENTRAL_HEADER_SIGNATURE: &[u8] = b"PK\x01\x02";
const CENTRAL_HEADER_LEN: usize = 46;

/// An error occurred when decoding an archive.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a readable zip container.
    #[error("invalid map: not a valid zip archive")]
    NotAnArchive(#[source] ZipError),
    /// An entry could not be decompressed.
    #[error("invalid map: entry '{entry}' could not be read")]
    UnreadableEntry {
        /// The entry name.
        entry: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// A JSON entry is not valid JSON, or does not have the expected shape.
    #[error("invalid map: '{entry}' contains malformed JSON at `{path}`")]
    MalformedJson {
        /// The entry name.
        entry: String,
        /// Path of the offending value inside the document.
        path: String,
        /// The underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// Two entries share a name.
    #[error("invalid map: entry '{0}' appears more than once")]
    DuplicateEntry(String),
    /// A hold note ends before it starts.
    #[error("invalid map: hold note in '{entry}' ends at {end}, before its start at {start}")]
    InvalidHold {
        /// The entry name.
        entry: String,
        /// Start of the hold.
        start: Millis,
        /// End of the hold.
        end: Millis,
    },
    /// The archive has more JSON entries than [`ArchiveLimits::max_json_entries`].
    #[error("invalid map: more than {limit} JSON entries")]
    TooManyJsonEntries {
        /// The configured limit.
        limit: usize,
    },
    /// The entries decompress to more than [`ArchiveLimits::max_decompressed_bytes`].
    #[error("invalid map: contents exceed {limit} bytes when decompressed")]
    ArchiveTooLarge {
        /// The configured limit.
        limit: u64,
    },
}

/// An error occurred when encoding an archive.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The zip writer failed.
    #[error("failed to write archive: {0}")]
    Zip(#[from] ZipError),
    /// Writing entry bytes failed.
    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON entry could not be serialised.
    #[error("failed to serialize '{entry}'")]
    Json {
        /// The entry name.
        entry: String,
        /// The underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// What an entry is, judged by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `meta.json`.
    Metadata,
    /// A difficulty chart.
    Difficulty,
    /// The background image.
    Background,
    /// The song audio.
    Audio,
    /// The background video.
    Video,
    /// A custom hitsound sample.
    HitsoundAsset,
    /// Anything else.
    Opaque,
}

impl EntryKind {
    /// Classifies an entry name.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        if name == METADATA_ENTRY {
            Self::Metadata
        } else if has_extension(name, &["json"]) {
            Self::Difficulty
        } else if has_extension(name, IMAGE_EXTENSIONS) {
            Self::Background
        } else if is_audio_track(name) {
            Self::Audio
        } else if has_extension(name, VIDEO_EXTENSIONS) {
            Self::Video
        } else if name.starts_with(HITSOUND_PREFIX) && !name.ends_with('/') {
            Self::HitsoundAsset
        } else {
            Self::Opaque
        }
    }

    const fn is_json(self) -> bool {
        matches!(self, Self::Metadata | Self::Difficulty)
    }
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    name.rsplit_once('.').is_some_and(|(_, extension)| {
        extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    })
}

fn is_audio_track(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, _)| stem == AUDIO_STEM)
        && has_extension(name, AUDIO_EXTENSIONS)
}

/// Decodes an archive held in memory.
///
/// A missing `meta.json` is not an error here; see
/// [`BeatmapArchive::require_metadata`].
///
/// # Errors
///
/// Returns [`DecodeError`] when the container cannot be opened, an entry is
/// unreadable or malformed, or a limit is exceeded.
pub fn decode(bytes: &[u8], limits: &ArchiveLimits) -> Result<BeatmapArchive, DecodeError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).map_err(DecodeError::NotAnArchive)?;
    if let Some(name) = repeated_name(bytes, zip.central_directory_start()) {
        return Err(DecodeError::DuplicateEntry(name));
    }
    let mut archive = BeatmapArchive::default();
    let mut seen = HashSet::new();
    let mut budget = limits.max_decompressed_bytes;
    let mut json_entries = 0usize;

    for index in 0..zip.len() {
        let (name, data) = read_entry(&mut zip, index, &mut budget, limits)?;
        if !seen.insert(name.clone()) {
            return Err(DecodeError::DuplicateEntry(name));
        }
        let kind = EntryKind::classify(&name);
        trace!("entry '{name}' ({} bytes) is {kind:?}", data.len());
        if kind.is_json() {
            json_entries += 1;
            if json_entries > limits.max_json_entries {
                return Err(DecodeError::TooManyJsonEntries {
                    limit: limits.max_json_entries,
                });
            }
        }

        match kind {
            EntryKind::Metadata => {
                archive.metadata = Some(parse_json::<Metadata>(&name, &data)?);
            }
            EntryKind::Difficulty => {
                let mut difficulty: Difficulty = parse_json(&name, &data)?;
                validate_holds(&name, &difficulty.notes)?;
                difficulty.source_name = name;
                archive.difficulties.push(difficulty);
            }
            EntryKind::Background if archive.background.is_none() => {
                match media::probe_background(AssetDescriptor::new(name, data)) {
                    Ok(background) => archive.background = Some(background),
                    Err(asset) => archive.opaque_entries.push(RawEntry {
                        name: asset.name,
                        data: asset.data,
                    }),
                }
            }
            EntryKind::Audio if archive.audio.is_none() => {
                archive.audio = Some(media::probe_audio(AssetDescriptor::new(name, data)));
            }
            EntryKind::Video if archive.video.is_none() => {
                archive.video = Some(AssetDescriptor::new(name, data));
            }
            EntryKind::HitsoundAsset => {
                archive
                    .hitsound_assets
                    .push(AssetDescriptor::new(name, data));
            }
            _ => archive.opaque_entries.push(RawEntry { name, data }),
        }
    }

    debug!(
        "decoded map with {} difficulties, {} hitsound samples and {} opaque entries",
        archive.difficulties.len(),
        archive.hitsound_assets.len(),
        archive.opaque_entries.len()
    );
    Ok(archive)
}

/// The first name that appears twice in the central directory starting at `start`.
///
/// The zip reader keys entries by name and keeps only the last of a repeated
/// one, so repetition is only visible in the raw records.
fn repeated_name(bytes: &[u8], start: u64) -> Option<String> {
    let field = |header: &[u8], at: usize| {
        header
            .get(at..at + 2)
            .and_then(|field| field.try_into().ok())
            .map_or(0, |field: [u8; 2]| usize::from(u16::from_le_bytes(field)))
    };
    let mut seen = HashSet::new();
    let mut rest = usize::try_from(start)
        .ok()
        .and_then(|start| bytes.get(start..))
        .unwrap_or_default();
    while let Some(header) = rest
        .get(..CENTRAL_HEADER_LEN)
        .filter(|header| header.starts_with(CENTRAL_HEADER_SIGNATURE))
    {
        let name_len = field(header, 28);
        let name = rest.get(CENTRAL_HEADER_LEN..CENTRAL_HEADER_LEN + name_len)?;
        if !seen.insert(name) {
            return Some(String::from_utf8_lossy(name).into_owned());
        }
        let record_len = CENTRAL_HEADER_LEN + name_len + field(header, 30) + field(header, 32);
        rest = rest.get(record_len..).unwrap_or_default();
    }
    None
}

fn read_entry(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    budget: &mut u64,
    limits: &ArchiveLimits,
) -> Result<(String, Vec<u8>), DecodeError> {
    let mut file = zip.by_index(index).map_err(DecodeError::NotAnArchive)?;
    let name = file.name().to_owned();
    let mut data = Vec::new();
    if let Err(source) = file.by_ref().take(budget.saturating_add(1)).read_to_end(&mut data) {
        return Err(DecodeError::UnreadableEntry {
            entry: name,
            source,
        });
    }
    *budget = budget
        .checked_sub(data.len() as u64)
        .ok_or(DecodeError::ArchiveTooLarge {
            limit: limits.max_decompressed_bytes,
        })?;
    Ok((name, data))
}

fn parse_json<T: DeserializeOwned>(entry: &str, data: &[u8]) -> Result<T, DecodeError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut deserializer = serde_json::Deserializer::from_slice(data);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        DecodeError::MalformedJson {
            entry: entry.to_owned(),
            path: error.path().to_string(),
            source: error.into_inner(),
        }
    })?;
    deserializer
        .end()
        .map_err(|source| DecodeError::MalformedJson {
            entry: entry.to_owned(),
            path: ".".to_owned(),
            source,
        })?;
    Ok(value)
}

fn validate_holds(entry: &str, notes: &[Note]) -> Result<(), DecodeError> {
    notes.iter().try_for_each(|note| match note {
        Note::Hold(hold) if hold.end_time < hold.start_time => Err(DecodeError::InvalidHold {
            entry: entry.to_owned(),
            start: hold.start_time,
            end: hold.end_time,
        }),
        _ => Ok(()),
    })
}

/// Encodes the model into a new archive.
///
/// # Errors
///
/// Returns [`EncodeError`] when an entry cannot be serialised or written.
pub fn encode(archive: &BeatmapArchive) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if let Some(metadata) = &archive.metadata {
        write_json(&mut writer, METADATA_ENTRY, metadata, options)?;
    }
    for difficulty in &archive.difficulties {
        write_json(&mut writer, &difficulty.source_name, difficulty, options)?;
    }
    for asset in archive.assets() {
        writer.start_file(asset.name.as_str(), options)?;
        writer.write_all(asset.data())?;
    }
    for entry in &archive.opaque_entries {
        if entry.is_directory() {
            writer.add_directory(entry.name.as_str(), options)?;
        } else {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

fn write_json<W: Write + std::io::Seek, T: Serialize>(
    writer: &mut ZipWriter<W>,
    entry: &str,
    value: &T,
    options: SimpleFileOptions,
) -> Result<(), EncodeError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| EncodeError::Json {
        entry: entry.to_owned(),
        source,
    })?;
    writer.start_file(entry, options)?;
    writer.write_all(&json)?;
    Ok(())
}
