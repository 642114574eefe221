mod common;

use pretty_assertions::assert_eq;
use rtm_rs::prelude::*;
use serde_json::json;

use common::{
    ArchiveBuilder, bare_tap, difficulty, entry_names, meta, png, raw_archive, read_entry, tap, wav,
};

fn full_map() -> Vec<u8> {
    ArchiveBuilder::new()
        .meta(&meta())
        .json(
            "easy.json",
            &difficulty("Easy", 4.0, json!([tap(1000, "soft", (true, false, false), 60)])),
        )
        .json("hard.json", &difficulty("Hard", 7.5, json!([bare_tap(1000), bare_tap(1500)])))
        .entry("bg.png", png(16, 9))
        .entry("audio.wav", wav(1))
        .entry("video.mp4", b"not really a video".to_vec())
        .entry("hitsounds/", Vec::new())
        .entry("hitsounds/soft-hitclap.wav", wav(1))
        .entry("readme.txt", b"hello".to_vec())
        .build()
}

#[test]
fn entries_are_classified() {
    let archive = decode(&full_map(), &default_config().limits).expect("map decodes");

    let metadata = archive.require_metadata().expect("metadata present");
    assert_eq!(metadata.song_name.as_deref(), Some("Song"));
    assert_eq!(metadata.preview_point(), Some(Millis(12000)));

    let names: Vec<_> = archive
        .difficulties
        .iter()
        .map(|difficulty| (difficulty.source_name.as_str(), difficulty.display_name.as_str()))
        .collect();
    assert_eq!(names, vec![("easy.json", "Easy"), ("hard.json", "Hard")]);
    assert_eq!(archive.difficulties[0].overall_difficulty, Some(4.0));
    assert_eq!(archive.difficulties[1].tap_count(), 2);

    let background = archive.background.as_ref().expect("background");
    assert_eq!((background.width, background.height), (16, 9));
    assert_eq!(background.asset.name, "bg.png");

    let audio = archive.audio.as_ref().expect("audio");
    let duration = audio.duration_seconds.expect("WAV length is readable");
    assert!((duration - 1.0).abs() < 0.01, "duration was {duration}");
    assert!(audio.bitrate_kbps.is_some_and(|kbps| kbps > 100.0));

    assert_eq!(archive.video.as_ref().map(|video| video.name.as_str()), Some("video.mp4"));
    assert_eq!(
        archive
            .hitsound_assets
            .iter()
            .map(|asset| asset.name.as_str())
            .collect::<Vec<_>>(),
        vec!["hitsounds/soft-hitclap.wav"]
    );
    assert_eq!(
        archive
            .opaque_entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>(),
        vec!["hitsounds/", "readme.txt"]
    );
}

#[test]
fn encode_then_decode_is_lossless() {
    let config = default_config();
    let archive = decode(&full_map(), &config.limits).expect("map decodes");
    let bytes = encode(&archive).expect("map encodes");
    let again = decode(&bytes, &config.limits).expect("rewritten map decodes");

    assert_eq!(again, archive);
    assert_eq!(read_entry(&bytes, "readme.txt"), b"hello".to_vec());
    assert_eq!(read_entry(&bytes, "hitsounds/soft-hitclap.wav"), wav(1));
    assert_eq!(read_entry(&bytes, "bg.png"), png(16, 9));
}

#[test]
fn unknown_keys_survive_a_rewrite() {
    let archive = decode(&full_map(), &default_config().limits).expect("map decodes");
    let bytes = encode(&archive).expect("map encodes");

    let meta: serde_json::Value =
        serde_json::from_slice(&read_entry(&bytes, "meta.json")).expect("meta is JSON");
    assert_eq!(meta["creatorNotes"], json!("kept as is"));
    let hard: serde_json::Value =
        serde_json::from_slice(&read_entry(&bytes, "hard.json")).expect("chart is JSON");
    assert_eq!(hard["scrollSpeed"], json!(1.5));
    assert_eq!(hard["notes"][0], json!({ "type": "tap", "time": 1000 }));
}

#[test]
fn rewritten_entries_are_ordered() {
    let archive = decode(&full_map(), &default_config().limits).expect("map decodes");
    let bytes = encode(&archive).expect("map encodes");

    assert_eq!(
        entry_names(&bytes),
        vec![
            "meta.json",
            "easy.json",
            "hard.json",
            "bg.png",
            "audio.wav",
            "video.mp4",
            "hitsounds/soft-hitclap.wav",
            "hitsounds/",
            "readme.txt",
        ]
    );
}

#[test]
fn missing_metadata_still_decodes() {
    let bytes = ArchiveBuilder::new()
        .json("easy.json", &difficulty("Easy", 4.0, json!([])))
        .build();
    let archive = decode(&bytes, &default_config().limits).expect("map decodes");

    assert!(archive.metadata.is_none());
    assert_eq!(archive.require_metadata(), Err(MissingMetadata));
}

#[test]
fn not_an_archive() {
    let error = decode(b"definitely not a zip", &default_config().limits).expect_err("rejected");
    assert!(matches!(error, DecodeError::NotAnArchive(_)), "{error:?}");
}

#[test]
fn malformed_json_names_the_entry() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .entry("broken.json", b"{ \"name\": ".to_vec())
        .build();
    let error = decode(&bytes, &default_config().limits).expect_err("rejected");

    match error {
        DecodeError::MalformedJson { entry, .. } => assert_eq!(entry, "broken.json"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unknown_note_type_is_malformed() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .json("easy.json", &difficulty("Easy", 4.0, json!([{ "type": "slide", "time": 5 }])))
        .build();
    let error = decode(&bytes, &default_config().limits).expect_err("rejected");

    assert!(matches!(error, DecodeError::MalformedJson { .. }), "{error:?}");
}

#[test]
fn hold_ending_before_its_start_is_rejected() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .json(
            "easy.json",
            &difficulty(
                "Easy",
                4.0,
                json!([{ "type": "hold", "startTime": 2000, "endTime": 1000 }]),
            ),
        )
        .build();
    let error = decode(&bytes, &default_config().limits).expect_err("rejected");

    match error {
        DecodeError::InvalidHold { entry, start, end } => {
            assert_eq!(entry, "easy.json");
            assert_eq!((start, end), (Millis(2000), Millis(1000)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn json_entry_limit() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .json("a.json", &difficulty("A", 4.0, json!([])))
        .json("b.json", &difficulty("B", 4.0, json!([])))
        .build();
    let config = default_config().with_max_json_entries(2);
    let error = decode(&bytes, &config.limits).expect_err("rejected");

    assert!(matches!(error, DecodeError::TooManyJsonEntries { limit: 2 }), "{error:?}");
    assert!(decode(&bytes, &default_config().with_max_json_entries(3).limits).is_ok());
}

#[test]
fn decompressed_size_limit() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .entry("padding.bin", vec![0; 4096])
        .build();
    let config = default_config().with_max_decompressed_bytes(1024);
    let error = decode(&bytes, &config.limits).expect_err("rejected");

    assert!(matches!(error, DecodeError::ArchiveTooLarge { limit: 1024 }), "{error:?}");
}

#[test]
fn unreadable_media_is_kept_opaque() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .entry("cover.jpg", b"not a jpeg".to_vec())
        .entry("audio.mp3", vec![0; 128])
        .build();
    let archive = decode(&bytes, &default_config().limits).expect("map decodes");

    assert!(archive.background.is_none());
    assert_eq!(
        archive.opaque_entries.first().map(|entry| entry.name.as_str()),
        Some("cover.jpg")
    );
    let audio = archive.audio.as_ref().expect("audio is still summarised");
    assert_eq!(audio.duration_seconds, None);
    assert_eq!(audio.bitrate_kbps, None);
}

#[test]
fn only_the_first_background_is_summarised() {
    let bytes = ArchiveBuilder::new()
        .meta(&meta())
        .entry("bg.png", png(32, 18))
        .entry("alt.png", png(8, 8))
        .build();
    let archive = decode(&bytes, &default_config().limits).expect("map decodes");

    assert_eq!(
        archive.background.as_ref().map(|bg| (bg.width, bg.height)),
        Some((32, 18))
    );
    assert_eq!(
        archive
            .opaque_entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>(),
        vec!["alt.png"]
    );
}

#[test]
fn hand_written_archive_decodes() {
    let archive = decode(&raw_archive(&["a.txt", "b.txt"]), &default_config().limits)
        .expect("map decodes");

    assert_eq!(
        archive
            .opaque_entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.data.len()))
            .collect::<Vec<_>>(),
        vec![("a.txt", 0), ("b.txt", 0)]
    );
}

#[test]
fn repeated_entry_names_are_rejected() {
    let bytes = raw_archive(&["meta.json", "readme.txt", "readme.txt"]);
    let error = decode(&bytes, &default_config().limits).expect_err("rejected");

    match error {
        DecodeError::DuplicateEntry(name) => assert_eq!(name, "readme.txt"),
        other => panic!("unexpected error {other:?}"),
    }
}
