//! Human readable renderings of chart times.

use crate::model::Millis;

/// Renders an instant as `mm:ss:mmm`, the way the editor displays positions.
#[must_use]
pub fn format_timestamp(at: Millis) -> String {
    let millis = at.0 % 1000;
    let total_seconds = at.0 / 1000;
    format!(
        "{:02}:{:02}:{millis:03}",
        total_seconds / 60,
        total_seconds % 60
    )
}

/// Renders a duration in seconds as `m:ss`. Fractions of a second are dropped.
#[must_use]
pub fn format_length(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", whole / 60, whole % 60)
}
