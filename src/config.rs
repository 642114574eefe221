//! Tolerances, thresholds and resource limits.
//!
//! Every component takes its numbers from a [`Config`] instead of ambient
//! constants. Start from [`default_config`] and override what you need:
//!
//! ```
//! use rtm_rs::{Millis, default_config};
//!
//! let config = default_config()
//!     .with_hitsound_tolerance(Millis(10))
//!     .with_max_json_entries(64);
//! assert_eq!(config.hitsound_tolerance, Millis(10));
//! assert_eq!(config.idle_gap_threshold, Millis(5000));
//! ```

use serde::{Deserialize, Serialize};

use crate::model::Millis;

/// Bounds on what [`crate::archive::decode`] is willing to materialise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveLimits {
    /// Maximum total decompressed size of all entries.
    pub max_decompressed_bytes: u64,
    /// Maximum number of JSON entries (metadata and difficulties).
    pub max_json_entries: usize,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: 256 * 1024 * 1024,
            max_json_entries: 256,
        }
    }
}

/// Configuration shared by every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Two instants closer than or equal to this are the same hitsound position.
    pub hitsound_tolerance: Millis,
    /// Gaps between notes at least this long do not count towards drain time.
    pub idle_gap_threshold: Millis,
    /// Maximum number of keys held or pressed at the same instant.
    pub max_simultaneous_keys: usize,
    /// Hold loop volumes above this are reported.
    pub hold_loop_volume_limit: u8,
    /// Typing sections faster than this many words per minute are reported.
    pub typing_wpm_limit: f64,
    /// Decoder resource limits.
    pub limits: ArchiveLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hitsound_tolerance: Millis(5),
            idle_gap_threshold: Millis(5000),
            max_simultaneous_keys: 10,
            hold_loop_volume_limit: 70,
            typing_wpm_limit: 80.0,
            limits: ArchiveLimits::default(),
        }
    }
}

/// The configuration used by the map verifier.
#[must_use]
pub fn default_config() -> Config {
    Config::default()
}

impl Config {
    /// Sets [`Config::hitsound_tolerance`].
    #[must_use]
    pub const fn with_hitsound_tolerance(mut self, tolerance: Millis) -> Self {
        self.hitsound_tolerance = tolerance;
        self
    }

    /// Sets [`Config::idle_gap_threshold`].
    #[must_use]
    pub const fn with_idle_gap_threshold(mut self, threshold: Millis) -> Self {
        self.idle_gap_threshold = threshold;
        self
    }

    /// Sets [`Config::max_simultaneous_keys`].
    #[must_use]
    pub const fn with_max_simultaneous_keys(mut self, keys: usize) -> Self {
        self.max_simultaneous_keys = keys;
        self
    }

    /// Sets [`Config::hold_loop_volume_limit`].
    #[must_use]
    pub const fn with_hold_loop_volume_limit(mut self, volume: u8) -> Self {
        self.hold_loop_volume_limit = volume;
        self
    }

    /// Sets [`Config::typing_wpm_limit`].
    #[must_use]
    pub const fn with_typing_wpm_limit(mut self, wpm: f64) -> Self {
        self.typing_wpm_limit = wpm;
        self
    }

    /// Sets [`ArchiveLimits::max_decompressed_bytes`].
    #[must_use]
    pub const fn with_max_decompressed_bytes(mut self, bytes: u64) -> Self {
        self.limits.max_decompressed_bytes = bytes;
        self
    }

    /// Sets [`ArchiveLimits::max_json_entries`].
    #[must_use]
    pub const fn with_max_json_entries(mut self, entries: usize) -> Self {
        self.limits.max_json_entries = entries;
        self
    }
}
