mod common;

use pretty_assertions::assert_eq;
use rtm_rs::prelude::*;
use serde_json::{Value, json};

use common::{ArchiveBuilder, bare_tap, difficulty, hold, meta, png, tap};

const CLAP: (bool, bool, bool) = (true, false, false);

/// Taps every second for `seconds` seconds.
fn steady_notes(seconds: u64) -> Value {
    (0..=seconds)
        .map(|second| tap(second * 1000, "soft", CLAP, 50))
        .collect()
}

fn build(meta: &Value, charts: &[Value], background: Option<Vec<u8>>) -> BeatmapArchive {
    let mut builder = ArchiveBuilder::new().meta(meta);
    for (index, chart) in charts.iter().enumerate() {
        builder = builder.json(&format!("diff{index}.json"), chart);
    }
    if let Some(background) = background {
        builder = builder.entry("bg.png", background);
    }
    decode(&builder.build(), &default_config().limits).expect("map decodes")
}

fn run(archive: &BeatmapArchive, pipeline: &CheckPipeline) -> VerifyOutput {
    verify(archive, pipeline, &default_config()).expect("map has metadata")
}

fn find<'a>(results: &'a [CheckResult], name: &str) -> &'a CheckResult {
    results
        .iter()
        .find(|result| result.name == name)
        .unwrap_or_else(|| panic!("no result named {name}: {results:#?}"))
}

#[test]
fn clean_map_only_passes() {
    let charts = [
        difficulty("Easy", 4.0, steady_notes(200)),
        difficulty("Hard", 7.0, steady_notes(200)),
    ];
    let archive = build(&meta(), &charts, Some(png(32, 18)));
    let output = run(&archive, &CheckPipeline::extended());

    let report: CheckReport = output
        .mapset
        .iter()
        .chain(output.difficulties.iter().flat_map(|d| &d.results))
        .cloned()
        .collect();
    assert!(report.is_clean(), "{report:#?}");
    assert_eq!(report.passes.len(), 7 + 2 * 5);

    let easy = &output.difficulties[0];
    assert_eq!(easy.name, "Easy");
    assert_eq!(easy.source_name, "diff0.json");
    assert_eq!(easy.drain_time, Millis(200_000));
    assert_eq!(find(&easy.results, "OD Check").message, "OD is set to 4.");
}

#[test]
fn metadata_is_required() {
    let bytes = ArchiveBuilder::new()
        .json("easy.json", &difficulty("Easy", 4.0, steady_notes(10)))
        .build();
    let archive = decode(&bytes, &default_config().limits).expect("map decodes");

    assert_eq!(
        verify(&archive, &CheckPipeline::default(), &default_config()),
        Err(MissingMetadata)
    );
}

#[test]
fn spread_follows_the_shortest_difficulty() {
    let spread = |seconds: u64| {
        let archive = build(
            &meta(),
            &[
                difficulty("Short", 5.0, steady_notes(seconds)),
                difficulty("Long", 5.0, steady_notes(300)),
            ],
            None,
        );
        find(&run(&archive, &CheckPipeline::default()).mapset, "Spread Requirements").clone()
    };

    let short = spread(10);
    assert_eq!(short.status, CheckStatus::Fail);
    assert_eq!(short.message, "Shortest difficulty is less than 30 seconds. (0:10)");

    let normal = spread(60);
    assert_eq!(normal.status, CheckStatus::Info);
    assert_eq!(
        normal.message,
        "Shortest difficulty is 1:00. Ensure you have at least a Normal difficulty, and all in-between difficulties."
    );

    assert!(spread(120).message.contains("at least a Hard difficulty"));
    assert!(spread(150).message.contains("at least an Insane difficulty"));
    assert_eq!(spread(180).status, CheckStatus::Pass);
}

#[test]
fn metadata_problems() {
    let archive = build(
        &json!({ "songName": "Song", "tags": "   ", "previewTime": -1 }),
        &[difficulty("Zabrid's Insane", 5.0, steady_notes(200))],
        Some(png(4000, 10)),
    );
    let output = run(&archive, &CheckPipeline::default());
    let report: CheckReport = output.mapset.iter().cloned().collect();

    let statuses: Vec<_> = output
        .mapset
        .iter()
        .map(|result| (result.name.as_str(), result.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Spread Requirements", CheckStatus::Pass),
            ("BG", CheckStatus::Warning),
            ("Tags Check", CheckStatus::Warning),
            ("Preview", CheckStatus::Fail),
            ("Missing GDers in tags.", CheckStatus::Warning),
            ("Missing Genre Tag", CheckStatus::Warning),
            ("HS Inconsistency", CheckStatus::Pass),
        ]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.warnings.len(), 4);

    assert_eq!(
        find(&output.mapset, "BG").message,
        "Background is larger than 2560x1440 (4000x10). Background is not 16:9."
    );
    assert_eq!(find(&output.mapset, "Tags Check").message, "Tags field is empty.");
    assert_eq!(find(&output.mapset, "Preview").message, "Preview point not set.");
    assert_eq!(
        find(&output.mapset, "Missing GDers in tags.").message,
        "\"Zabrid's Insane\" is possessive but \"zabrid\" isn't in the tags, ignore if not a user."
    );
    assert_eq!(
        find(&output.mapset, "Missing Genre Tag").message,
        "No recognized genre tag found. Consider adding one of: rock, pop, electronic, hip-hop, jazz, classical, metal, indie, r&b, country, etc."
    );
}

#[test]
fn tagged_guest_difficulty_passes() {
    let archive = build(
        &json!({ "tags": "electronic Zabrid", "previewTime": 0 }),
        &[difficulty("Zabrid's Insane", 5.0, steady_notes(200))],
        None,
    );
    let output = run(&archive, &CheckPipeline::default());

    assert_eq!(find(&output.mapset, "GDer Tags Check").status, CheckStatus::Pass);
    assert_eq!(find(&output.mapset, "Genre Check").status, CheckStatus::Pass);
    assert_eq!(find(&output.mapset, "Preview").status, CheckStatus::Pass);
}

#[test]
fn hitsound_inconsistency_lists_five_pairs() {
    let flags = [
        (true, false, false),
        (false, true, false),
        (false, false, true),
        (true, true, false),
    ];
    let charts: Vec<_> = flags
        .iter()
        .enumerate()
        .map(|(index, &flags)| {
            difficulty(&format!("D{index}"), 5.0, json!([tap(1000, "soft", flags, 50)]))
        })
        .collect();
    let archive = build(&meta(), &charts, None);
    let output = run(&archive, &CheckPipeline::default());
    let result = find(&output.mapset, "HS Inconsistency");

    assert_eq!(result.status, CheckStatus::Warning);
    let lines: Vec<_> = result.message.lines().collect();
    assert_eq!(lines.len(), 1 + 5 + 1);
    assert_eq!(
        lines[0],
        "Ensure these are intentional. If they're not, consider using __/copyhitsounds__ to make them consistent."
    );
    assert_eq!(lines[1], "- 'D0' and 'D1' have mismatched hitsounds (1 differences)");
    assert_eq!(lines[6], "- etc.");

    let attachment = result.attachment.as_ref().expect("attachment");
    assert_eq!(attachment.file_name, "hitsound_differences.txt");
    assert_eq!(attachment.contents.matches("Hitsound differences between").count(), 6);
}

#[test]
fn difficulty_checks() {
    let crowded: Vec<Value> = (0..11).map(|_| bare_tap(1000)).collect();
    let charts = [
        difficulty("Empty", 0.0, json!([])),
        difficulty("Crowded", 1.5, Value::from(crowded)),
        json!({
            "name": "Loud",
            "overallDifficulty": 9,
            "notes": [
                hold(1000, 2000, "soft", CLAP, CLAP, 50, 80),
                hold(3000, 4000, "soft", CLAP, CLAP, 50, 70)
            ],
            "typingSections": [
                { "startTime": 0, "endTime": 1000, "text": "hello world" },
                { "startTime": 0, "endTime": 60000, "text": "slow" }
            ]
        }),
    ];
    let archive = build(&meta(), &charts, None);
    let output = run(&archive, &CheckPipeline::extended());
    let results = |index: usize| &output.difficulties[index].results;

    let empty = results(0);
    assert_eq!(find(empty, "Notes").message, "This difficulty has no notes placed.");
    assert_eq!(find(empty, "OD Check").status, CheckStatus::Fail);
    assert_eq!(find(empty, "OD Check").message, "OD has not been set.");

    let crowded = results(1);
    assert_eq!(
        find(crowded, "OD Check").message,
        "OD is low (1.5). Ensure this makes sense for your difficulty."
    );
    assert_eq!(find(crowded, "Keys").status, CheckStatus::Fail);
    assert_eq!(
        find(crowded, "Keys").message,
        "More than 10 keys pressed at 00:01:000 (11 keys)."
    );

    let loud = results(2);
    assert_eq!(
        find(loud, "OD Check").message,
        "OD is high (9). Ensure this makes sense for your difficulty."
    );
    assert_eq!(find(loud, "Keys").status, CheckStatus::Pass);
    assert_eq!(
        find(loud, "Hold Volume").message,
        "1 held note(s) have a hold loop volume over 70. Make sure these are intentional, as they can potientially be unintentionally obnoxious."
    );
    assert_eq!(
        find(loud, "Typing WPM").message,
        "Typing section(s) requires more than 80 WPM which is quite fast. Ensure this makes sense: \"hello world\" (132.0 WPM)"
    );
}

#[test]
fn default_pipeline_skips_the_extra_checks() {
    let archive = build(&meta(), &[difficulty("Easy", 5.0, steady_notes(200))], None);
    let output = run(&archive, &CheckPipeline::default());

    let names: Vec<_> = output.difficulties[0]
        .results
        .iter()
        .map(|result| result.name.as_str())
        .collect();
    assert_eq!(names, vec!["Notes", "OD Check"]);
}
