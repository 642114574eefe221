//! Decoder, verifier and hitsound tools for RTM beatmap archives.
//!
//! An RTM map is a zip archive holding a `meta.json` metadata record, one JSON
//! chart per difficulty and the media assets (background image, song audio,
//! optional video, custom hitsound samples).
//!
//! The crate is organised leaf-first:
//!
//! - [`archive`] opens the container and decodes it into a [`model::BeatmapArchive`],
//!   and encodes a (possibly modified) model back into archive bytes.
//! - [`model`] is the typed in-memory beatmap: metadata, difficulties and notes.
//! - [`timeline`] normalises a note list into timed instants and hitsound cues.
//! - [`drain`] reduces a note timeline to its effective play duration.
//! - [`hitsound`] matches cues between difficulties, copying them from one
//!   difficulty into the others or reporting where they disagree.
//! - [`check`] runs the rule-based verification predicates over a decoded map
//!   (behind the default `checks` feature).
//! - [`online`] derives the listing service addresses and reads its metadata.
//!
//! # Example
//!
//! ```no_run
//! use rtm_rs::prelude::*;
//!
//! # fn run(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let config = default_config();
//! let archive = decode(bytes, &config.limits)?;
//! for difficulty in &archive.difficulties {
//!     let millis = drain_time(&difficulty.notes, &config);
//!     println!("{}: {}", difficulty.label(), format_length(millis.as_secs_f64()));
//! }
//!
//! let report = reconcile_diff(&archive, &config);
//! println!("{} inconsistent pairs", report.entries.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod archive;
#[cfg(feature = "checks")]
#[cfg_attr(docsrs, doc(cfg(feature = "checks")))]
pub mod check;
pub mod config;
pub mod drain;
pub mod format;
pub mod hitsound;
pub mod model;
pub mod online;
pub mod prelude;
pub mod timeline;

pub use self::config::{Config, default_config};
pub use self::model::Millis;
