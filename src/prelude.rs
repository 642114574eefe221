//! Prelude module for the crate.
//!
//! Re-exports the types and entry points most callers need, so that
//! `use rtm_rs::prelude::*;` is enough to decode, analyse and rewrite a map.

pub use crate::{
    archive::{DecodeError, EncodeError, EntryKind, decode, encode},
    config::{ArchiveLimits, Config, default_config},
    drain::{drain_time, drain_time_of},
    format::{format_length, format_timestamp},
    hitsound::{
        CopyOptions, CopyOutput, CopyStats, DiffEntry, DiffReport, Matcher, ReconcileError,
        apply_copy, copy_hitsounds, reconcile_copy, reconcile_diff,
    },
    model::{
        AssetDescriptor, AudioDescriptor, BackgroundDescriptor, BeatmapArchive, Difficulty,
        HitsoundCue, HoldHitsoundCue, HoldLoop, HoldNote, Metadata, Millis, MissingMetadata, Note,
        RawEntry, SoundFlags, Sounds, TapNote, TypingSection,
    },
    online::{OnlineBeatmap, OnlineDifficulty, OnlineMetadata, archive_url, beatmap_id_from_url},
    timeline::{Cue, Timeline},
};

#[cfg(feature = "checks")]
pub use crate::check::{
    CheckPipeline, CheckReport, CheckResult, CheckStatus, DifficultyContext, MapsetContext,
    VerifyOutput, verify,
};
