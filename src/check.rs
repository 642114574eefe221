//! Rule-based verification of a decoded map.
//!
//! A [`CheckPipeline`] holds two lists of plain function pointers: mapset checks
//! that look at the whole archive, and difficulty checks that run once per
//! chart. [`verify`] runs them in order and collects one [`CheckResult`] per
//! check.
//!
//! ```no_run
//! use rtm_rs::{archive::decode, check::{CheckPipeline, CheckReport, verify}, default_config};
//!
//! # fn run(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let config = default_config();
//! let archive = decode(bytes, &config.limits)?;
//! let output = verify(&archive, &CheckPipeline::extended(), &config)?;
//! let report: CheckReport = output.mapset.iter().cloned().collect();
//! for failure in &report.failures {
//!     println!("{}: {}", failure.name, failure.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod difficulty;
pub mod mapset;

use log::debug;

use crate::{
    config::Config,
    drain::drain_time,
    model::{BeatmapArchive, Difficulty, Metadata, Millis, MissingMetadata},
};

/// Severity of a check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckStatus {
    /// Nothing to report.
    Pass,
    /// Worth a look, not necessarily wrong.
    Warning,
    /// Must be fixed before submission.
    Fail,
    /// Advice that does not indicate a problem.
    Info,
}

/// A file attached to a check outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attachment {
    /// File name to present the contents under.
    pub file_name: String,
    /// Text contents.
    pub contents: String,
}

/// The outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckResult {
    /// Severity.
    pub status: CheckStatus,
    /// Short title of the check.
    pub name: String,
    /// Details, empty for most passes.
    pub message: String,
    /// Long form details that do not fit in the message.
    pub attachment: Option<Attachment>,
}

impl CheckResult {
    /// A result with the given status and message.
    #[must_use]
    pub fn new(status: CheckStatus, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
            message: message.into(),
            attachment: None,
        }
    }

    /// A pass without a message.
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, name, String::new())
    }

    /// Attaches a file to the result.
    #[must_use]
    pub fn with_attachment(
        mut self,
        file_name: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        self.attachment = Some(Attachment {
            file_name: file_name.into(),
            contents: contents.into(),
        });
        self
    }
}

/// Results grouped by severity, each group in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// [`CheckStatus::Fail`] results.
    pub failures: Vec<CheckResult>,
    /// [`CheckStatus::Warning`] results.
    pub warnings: Vec<CheckResult>,
    /// [`CheckStatus::Info`] results.
    pub infos: Vec<CheckResult>,
    /// [`CheckStatus::Pass`] results.
    pub passes: Vec<CheckResult>,
}

impl CheckReport {
    /// Whether nothing but passes was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty() && self.infos.is_empty()
    }
}

impl FromIterator<CheckResult> for CheckReport {
    fn from_iter<T: IntoIterator<Item = CheckResult>>(iter: T) -> Self {
        let mut report = Self::default();
        for result in iter {
            match result.status {
                CheckStatus::Fail => report.failures.push(result),
                CheckStatus::Warning => report.warnings.push(result),
                CheckStatus::Info => report.infos.push(result),
                CheckStatus::Pass => report.passes.push(result),
            }
        }
        report
    }
}

/// What a mapset check gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct MapsetContext<'a> {
    /// The whole map.
    pub archive: &'a BeatmapArchive,
    /// Its metadata, known to be present.
    pub metadata: &'a Metadata,
    /// Drain time of each difficulty, in archive order.
    pub drain_times: &'a [Millis],
    /// Thresholds.
    pub config: &'a Config,
}

/// What a difficulty check gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyContext<'a> {
    /// The chart under test.
    pub difficulty: &'a Difficulty,
    /// Its drain time.
    pub drain_time: Millis,
    /// Thresholds.
    pub config: &'a Config,
}

/// A check over the whole map.
pub type MapsetCheck = fn(&MapsetContext<'_>) -> CheckResult;

/// A check over one difficulty.
pub type DifficultyCheck = fn(&DifficultyContext<'_>) -> CheckResult;

/// Ordered lists of checks to run.
#[derive(Debug, Clone)]
pub struct CheckPipeline {
    /// Run once per map.
    pub mapset: Vec<MapsetCheck>,
    /// Run once per difficulty.
    pub difficulty: Vec<DifficultyCheck>,
}

impl Default for CheckPipeline {
    /// The checks the verifier runs on every submission.
    fn default() -> Self {
        Self {
            mapset: vec![
                mapset::spread_requirements,
                mapset::background,
                mapset::tags,
                mapset::preview,
                mapset::gder_tags,
                mapset::genre,
                mapset::hitsound_consistency,
            ],
            difficulty: vec![difficulty::notes, difficulty::overall_difficulty],
        }
    }
}

impl CheckPipeline {
    /// The default checks plus keys, hold volume and typing speed.
    #[must_use]
    pub fn extended() -> Self {
        Self::default()
            .with_difficulty_check(difficulty::keys)
            .with_difficulty_check(difficulty::hold_volume)
            .with_difficulty_check(difficulty::typing_wpm)
    }

    /// Appends a mapset check.
    #[must_use]
    pub fn with_mapset_check(mut self, check: MapsetCheck) -> Self {
        self.mapset.push(check);
        self
    }

    /// Appends a difficulty check.
    #[must_use]
    pub fn with_difficulty_check(mut self, check: DifficultyCheck) -> Self {
        self.difficulty.push(check);
        self
    }
}

/// Results for one difficulty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyVerification {
    /// The difficulty's display label.
    pub name: String,
    /// The archive entry it came from.
    pub source_name: String,
    /// Its drain time.
    pub drain_time: Millis,
    /// One result per difficulty check, in pipeline order.
    pub results: Vec<CheckResult>,
}

/// Output of [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutput {
    /// One result per mapset check, in pipeline order.
    pub mapset: Vec<CheckResult>,
    /// Per difficulty results, in archive order.
    pub difficulties: Vec<DifficultyVerification>,
}

/// Runs `pipeline` over the map.
///
/// # Errors
///
/// Returns [`MissingMetadata`] before running any check when the map has no
/// `meta.json`.
pub fn verify(
    archive: &BeatmapArchive,
    pipeline: &CheckPipeline,
    config: &Config,
) -> Result<VerifyOutput, MissingMetadata> {
    let metadata = archive.require_metadata()?;
    let drain_times: Vec<Millis> = archive
        .difficulties
        .iter()
        .map(|difficulty| drain_time(&difficulty.notes, config))
        .collect();

    let context = MapsetContext {
        archive,
        metadata,
        drain_times: &drain_times,
        config,
    };
    let mapset = pipeline.mapset.iter().map(|check| check(&context)).collect();

    let difficulties = archive
        .difficulties
        .iter()
        .zip(&drain_times)
        .map(|(difficulty, &drain_time)| {
            let context = DifficultyContext {
                difficulty,
                drain_time,
                config,
            };
            DifficultyVerification {
                name: difficulty.label().to_owned(),
                source_name: difficulty.source_name.clone(),
                drain_time,
                results: pipeline
                    .difficulty
                    .iter()
                    .map(|check| check(&context))
                    .collect(),
            }
        })
        .collect();

    debug!(
        "ran {} mapset and {} difficulty checks over {} difficulties",
        pipeline.mapset.len(),
        pipeline.difficulty.len(),
        archive.difficulties.len()
    );
    Ok(VerifyOutput {
        mapset,
        difficulties,
    })
}
