//! Builders for in-memory test maps.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{Value, json};
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

/// Collects entries and writes them into a zip archive in insertion order.
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, name: &str, data: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.to_owned(), data.into()));
        self
    }

    pub fn json(self, name: &str, value: &Value) -> Self {
        let data = serde_json::to_vec(value).expect("test JSON serializes");
        self.entry(name, data)
    }

    pub fn meta(self, value: &Value) -> Self {
        self.json("meta.json", value)
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in self.entries {
            if name.ends_with('/') {
                writer.add_directory(name.as_str(), options).expect("directory");
            } else {
                writer.start_file(name.as_str(), options).expect("entry");
                writer.write_all(&data).expect("entry bytes");
            }
        }
        writer.finish().expect("archive").into_inner()
    }
}

/// An archive of empty stored entries, written record by record so that names may repeat.
pub fn raw_archive(names: &[&str]) -> Vec<u8> {
    const VERSION: u16 = 20;
    const DOS_DATE: u16 = (1 << 5) | 1;

    let mut local = Vec::new();
    let mut central = Vec::new();
    for name in names {
        let offset = u32::try_from(local.len()).expect("archive is small");
        let name_len = u16::try_from(name.len()).expect("name is short");

        local.extend_from_slice(b"PK\x03\x04");
        local.extend_from_slice(&VERSION.to_le_bytes());
        local.extend_from_slice(&[0; 6]); // flags, stored, time
        local.extend_from_slice(&DOS_DATE.to_le_bytes());
        local.extend_from_slice(&[0; 12]); // crc and sizes of an empty entry
        local.extend_from_slice(&name_len.to_le_bytes());
        local.extend_from_slice(&[0; 2]); // extra
        local.extend_from_slice(name.as_bytes());

        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&VERSION.to_le_bytes());
        central.extend_from_slice(&VERSION.to_le_bytes());
        central.extend_from_slice(&[0; 6]); // flags, stored, time
        central.extend_from_slice(&DOS_DATE.to_le_bytes());
        central.extend_from_slice(&[0; 12]); // crc and sizes of an empty entry
        central.extend_from_slice(&name_len.to_le_bytes());
        central.extend_from_slice(&[0; 12]); // extra, comment, disk, attributes
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let count = u16::try_from(names.len()).expect("few entries");
    let central_len = u32::try_from(central.len()).expect("archive is small");
    let central_offset = u32::try_from(local.len()).expect("archive is small");
    let mut bytes = local;
    bytes.append(&mut central);
    bytes.extend_from_slice(b"PK\x05\x06");
    bytes.extend_from_slice(&[0; 4]); // disk numbers
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend_from_slice(&central_len.to_le_bytes());
    bytes.extend_from_slice(&central_offset.to_le_bytes());
    bytes.extend_from_slice(&[0; 2]); // comment
    bytes
}

/// Reads one entry of an encoded archive.
pub fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).expect("archive opens");
    let mut file = zip.by_name(name).expect("entry exists");
    let mut data = Vec::new();
    file.read_to_end(&mut data).expect("entry reads");
    data
}

/// Entry names of an encoded archive, in archive order.
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let zip = ZipArchive::new(Cursor::new(bytes)).expect("archive opens");
    zip.file_names().map(str::to_owned).collect()
}

/// A complete, valid `meta.json`.
pub fn meta() -> Value {
    json!({
        "songName": "Song",
        "artistName": "Artist",
        "mapper": "Mapper",
        "tags": "rock mapper",
        "previewTime": 12000,
        "creatorNotes": "kept as is"
    })
}

pub fn difficulty(name: &str, overall_difficulty: f64, notes: Value) -> Value {
    json!({
        "name": name,
        "overallDifficulty": overall_difficulty,
        "notes": notes,
        "scrollSpeed": 1.5
    })
}

pub fn sounds(clap: bool, whistle: bool, finish: bool) -> Value {
    json!({ "hitclap": clap, "hitwhistle": whistle, "hitfinish": finish })
}

/// A tap with a cue, `sounds` given as `(clap, whistle, finish)`.
pub fn tap(time: u64, sample_set: &str, flags: (bool, bool, bool), volume: u8) -> Value {
    json!({
        "type": "tap",
        "time": time,
        "hitsound": {
            "sampleSet": sample_set,
            "sounds": sounds(flags.0, flags.1, flags.2),
            "volume": volume
        }
    })
}

/// A tap without any cue.
pub fn bare_tap(time: u64) -> Value {
    json!({ "type": "tap", "time": time })
}

/// A hold with start and end cues and a sustain loop.
pub fn hold(
    start_time: u64,
    end_time: u64,
    sample_set: &str,
    start: (bool, bool, bool),
    end: (bool, bool, bool),
    edge_volume: u8,
    loop_volume: u8,
) -> Value {
    json!({
        "type": "hold",
        "startTime": start_time,
        "endTime": end_time,
        "hitsound": {
            "sampleSet": sample_set,
            "start": { "sounds": sounds(start.0, start.1, start.2), "volume": edge_volume },
            "end": { "sounds": sounds(end.0, end.1, end.2), "volume": edge_volume },
            "hold": { "volume": loop_volume }
        }
    })
}

/// A black PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut data, ImageFormat::Png)
        .expect("PNG encodes");
    data.into_inner()
}

/// A silent mono 16-bit WAV of the given length.
pub fn wav(seconds: u32) -> Vec<u8> {
    const SAMPLE_RATE: u32 = 8000;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut data = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut data, spec).expect("WAV header");
        for _ in 0..SAMPLE_RATE * seconds {
            writer.write_sample(0i16).expect("WAV sample");
        }
        writer.finalize().expect("WAV finalizes");
    }
    data.into_inner()
}
