//! Checks over the whole map.

use std::{collections::HashSet, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;

use crate::{format::format_length, hitsound::reconcile_diff};

use super::{CheckResult, CheckStatus, MapsetContext};

/// Largest background accepted without a warning.
pub const MAX_BACKGROUND_SIZE: (u32, u32) = (2560, 1440);

/// Tags recognised as a genre, matched as substrings of the lowercased tags.
pub const GENRES: &[&str] = &[
    "rock",
    "pop",
    "electronic",
    "hip-hop",
    "jazz",
    "classical",
    "metal",
    "indie",
    "r&b",
    "country",
    "folk",
    "punk",
    "blues",
    "soul",
    "reggae",
    "edm",
    "house",
    "techno",
    "dubstep",
    "drum and bass",
    "dnb",
    "trance",
    "ambient",
    "lo-fi",
    "vocaloid",
    "j-pop",
    "j-rock",
    "k-pop",
    "anime",
    "video game",
    "soundtrack",
    "orchestral",
    "acoustic",
    "alternative",
    "experimental",
    "instrumental",
];

/// Pairs named in the message before it is cut short.
const LISTED_PAIRS: usize = 5;

/// `Name's Insane`
static POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\w+)'s\b").expect("pattern is valid"));
/// `James' Insane`
static PLURAL_POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\w+s)'(?:\W|$)").expect("pattern is valid"));

/// The shortest drain time decides which difficulties the spread must contain.
#[must_use]
pub fn spread_requirements(context: &MapsetContext<'_>) -> CheckResult {
    const NAME: &str = "Spread Requirements";
    let Some(shortest) = context.drain_times.iter().min() else {
        return CheckResult::pass(NAME);
    };
    let seconds = shortest.as_secs_f64();
    let length = format_length(seconds);

    let lowest = if seconds < 30.0 {
        return CheckResult::new(
            CheckStatus::Fail,
            NAME,
            format!("Shortest difficulty is less than 30 seconds. ({length})"),
        );
    } else if seconds < 90.0 {
        "a Normal"
    } else if seconds < 135.0 {
        "a Hard"
    } else if seconds < 180.0 {
        "an Insane"
    } else {
        return CheckResult::pass(NAME);
    };
    CheckResult::new(
        CheckStatus::Info,
        NAME,
        format!(
            "Shortest difficulty is {length}. Ensure you have at least {lowest} difficulty, and all in-between difficulties."
        ),
    )
}

/// The background must fit in 2560x1440 and be 16:9.
#[must_use]
pub fn background(context: &MapsetContext<'_>) -> CheckResult {
    const NAME: &str = "BG";
    let Some(background) = &context.archive.background else {
        return CheckResult::pass(NAME);
    };
    let (width, height) = (background.width, background.height);
    let (max_width, max_height) = MAX_BACKGROUND_SIZE;

    let mut problems = Vec::new();
    if width > max_width || height > max_height {
        problems.push(format!(
            "Background is larger than {max_width}x{max_height} ({width}x{height})."
        ));
    }
    if u64::from(width) * 9 != u64::from(height) * 16 {
        problems.push("Background is not 16:9.".to_owned());
    }

    if problems.is_empty() {
        CheckResult::pass(NAME)
    } else {
        CheckResult::new(CheckStatus::Warning, NAME, problems.join(" "))
    }
}

/// Tags must not be blank.
#[must_use]
pub fn tags(context: &MapsetContext<'_>) -> CheckResult {
    const NAME: &str = "Tags Check";
    if context.metadata.tags().trim().is_empty() {
        CheckResult::new(CheckStatus::Warning, NAME, "Tags field is empty.")
    } else {
        CheckResult::pass(NAME)
    }
}

/// The preview point must be set.
#[must_use]
pub fn preview(context: &MapsetContext<'_>) -> CheckResult {
    const NAME: &str = "Preview";
    if context.metadata.preview_point().is_some() {
        CheckResult::pass(NAME)
    } else {
        CheckResult::new(CheckStatus::Fail, NAME, "Preview point not set.")
    }
}

/// Guest difficulty owners named in a possessive difficulty name should be tagged.
#[must_use]
pub fn gder_tags(context: &MapsetContext<'_>) -> CheckResult {
    let lowercase = context.metadata.tags().to_lowercase();
    let tags: &HashSet<&str> = &lowercase.split_whitespace().collect();

    let messages: Vec<String> = context
        .archive
        .difficulties
        .iter()
        .flat_map(|difficulty| {
            let name = difficulty.display_name.as_str();
            POSSESSIVE
                .captures_iter(name)
                .chain(PLURAL_POSSESSIVE.captures_iter(name))
                .filter_map(|captures| captures.get(1))
                .map(|owner| owner.as_str().to_lowercase())
                .filter(move |owner| !tags.contains(owner.as_str()))
                .map(move |owner| {
                    format!(
                        "\"{name}\" is possessive but \"{owner}\" isn't in the tags, ignore if not a user."
                    )
                })
        })
        .collect();

    if messages.is_empty() {
        CheckResult::pass("GDer Tags Check")
    } else {
        CheckResult::new(CheckStatus::Warning, "Missing GDers in tags.", messages.join("\n"))
    }
}

/// At least one tag should name a genre.
#[must_use]
pub fn genre(context: &MapsetContext<'_>) -> CheckResult {
    let tags = context.metadata.tags().to_lowercase();
    if GENRES.iter().any(|genre| tags.contains(genre)) {
        return CheckResult::pass("Genre Check");
    }
    CheckResult::new(
        CheckStatus::Warning,
        "Missing Genre Tag",
        format!(
            "No recognized genre tag found. Consider adding one of: {}, etc.",
            GENRES.iter().take(10).join(", ")
        ),
    )
}

/// Difficulties should agree on hitsounds where they share note instants.
#[must_use]
pub fn hitsound_consistency(context: &MapsetContext<'_>) -> CheckResult {
    const NAME: &str = "HS Inconsistency";
    let report = reconcile_diff(context.archive, context.config);
    let Some((file_name, contents)) = report.attachment() else {
        return CheckResult::pass(NAME);
    };

    let mut lines = vec![
        "Ensure these are intentional. If they're not, consider using __/copyhitsounds__ to make them consistent."
            .to_owned(),
    ];
    lines.extend(report.entries.iter().take(LISTED_PAIRS).map(|entry| {
        format!(
            "- '{}' and '{}' have mismatched hitsounds ({} differences)",
            entry.first,
            entry.second,
            entry.instants.len()
        )
    }));
    if report.entries.len() > LISTED_PAIRS {
        lines.push("- etc.".to_owned());
    }
    CheckResult::new(CheckStatus::Warning, NAME, lines.join("\n"))
        .with_attachment(file_name, contents)
}
