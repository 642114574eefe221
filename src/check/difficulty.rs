//! Checks over a single difficulty.

use itertools::Itertools;

use crate::{format::format_timestamp, model::Note, timeline::Timeline};

use super::{CheckResult, CheckStatus, DifficultyContext};

/// Overall difficulty below this is reported as low.
pub const LOW_OVERALL_DIFFICULTY: f64 = 2.0;
/// Overall difficulty above this is reported as high.
pub const HIGH_OVERALL_DIFFICULTY: f64 = 8.0;

/// A difficulty must contain notes.
#[must_use]
pub fn notes(context: &DifficultyContext<'_>) -> CheckResult {
    const NAME: &str = "Notes";
    if context.difficulty.notes.is_empty() {
        CheckResult::new(CheckStatus::Fail, NAME, "This difficulty has no notes placed.")
    } else {
        CheckResult::pass(NAME)
    }
}

/// Overall difficulty must be set and should be in a sensible range.
#[must_use]
pub fn overall_difficulty(context: &DifficultyContext<'_>) -> CheckResult {
    const NAME: &str = "OD Check";
    let od = context.difficulty.overall_difficulty.unwrap_or_default();
    if od == 0.0 {
        CheckResult::new(CheckStatus::Fail, NAME, "OD has not been set.")
    } else if od < LOW_OVERALL_DIFFICULTY {
        CheckResult::new(
            CheckStatus::Warning,
            NAME,
            format!("OD is low ({od}). Ensure this makes sense for your difficulty."),
        )
    } else if od > HIGH_OVERALL_DIFFICULTY {
        CheckResult::new(
            CheckStatus::Warning,
            NAME,
            format!("OD is high ({od}). Ensure this makes sense for your difficulty."),
        )
    } else {
        CheckResult::new(CheckStatus::Pass, NAME, format!("OD is set to {od}."))
    }
}

/// No instant may need more than [`crate::Config::max_simultaneous_keys`] keys.
///
/// A tap counts at its exact instant, a hold at every instant from its start
/// to its end inclusive. The earliest offending instant is reported.
#[must_use]
pub fn keys(context: &DifficultyContext<'_>) -> CheckResult {
    const NAME: &str = "Keys";
    let notes = &context.difficulty.notes;
    let limit = context.config.max_simultaneous_keys;
    let timeline = Timeline::extract(notes);

    let crowded = timeline.instants().iter().find_map(|&at| {
        let count = notes.iter().filter(|note| note.is_active_at(at)).count();
        (count > limit).then_some((at, count))
    });
    match crowded {
        Some((at, count)) => CheckResult::new(
            CheckStatus::Fail,
            NAME,
            format!(
                "More than {limit} keys pressed at {} ({count} keys).",
                format_timestamp(at)
            ),
        ),
        None => CheckResult::pass(NAME),
    }
}

/// Hold loops louder than [`crate::Config::hold_loop_volume_limit`] are reported.
#[must_use]
pub fn hold_volume(context: &DifficultyContext<'_>) -> CheckResult {
    const NAME: &str = "Hold Volume";
    let limit = context.config.hold_loop_volume_limit;
    let loud = context
        .difficulty
        .notes
        .iter()
        .filter_map(|note| match note {
            Note::Hold(hold) => hold.hitsound.as_ref(),
            Note::Tap(_) => None,
        })
        .filter_map(|hitsound| hitsound.hold_loop.as_ref()?.volume)
        .filter(|&volume| volume > limit)
        .count();

    if loud == 0 {
        return CheckResult::pass(NAME);
    }
    CheckResult::new(
        CheckStatus::Warning,
        NAME,
        format!(
            "{loud} held note(s) have a hold loop volume over {limit}. Make sure these are intentional, as they can potientially be unintentionally obnoxious."
        ),
    )
}

/// Words per minute needed to type `text` in `duration_ms`, five characters per word.
///
/// A section with no time to type is infinitely fast.
#[must_use]
pub fn words_per_minute(text: &str, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return f64::INFINITY;
    }
    let words = text.chars().count() as f64 / 5.0;
    words / (duration_ms as f64 / 60_000.0)
}

/// Typing sections faster than [`crate::Config::typing_wpm_limit`] are reported.
#[must_use]
pub fn typing_wpm(context: &DifficultyContext<'_>) -> CheckResult {
    const NAME: &str = "Typing WPM";
    let limit = context.config.typing_wpm_limit;
    let fast = context
        .difficulty
        .typing_sections()
        .iter()
        .filter_map(|section| {
            let duration = section.end_time.0.saturating_sub(section.start_time.0);
            let wpm = words_per_minute(&section.text, duration);
            (wpm > limit).then(|| format!("\"{}\" ({wpm:.1} WPM)", section.text))
        })
        .join(", ");

    if fast.is_empty() {
        return CheckResult::pass(NAME);
    }
    CheckResult::new(
        CheckStatus::Warning,
        NAME,
        format!(
            "Typing section(s) requires more than {limit} WPM which is quite fast. Ensure this makes sense: {fast}"
        ),
    )
}
