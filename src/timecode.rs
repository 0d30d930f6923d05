//! Time formatting for the two subtitle formats.
//!
//! SRT uses millisecond precision with a comma separator; ASS uses
//! centisecond precision with a dot. The two are deliberately separate
//! functions rather than one parameterized formatter so a caller can never
//! feed SRT timestamps into an ASS document by accident. Both truncate the
//! sub-second part instead of rounding, matching what renderers expect.

use crate::error::{ReelcapError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// SRT time line: `H:MM:SS,mmm` with one or more hour digits.
fn srt_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+):(\d{2}):(\d{2}),(\d{3})$").expect("Invalid regex"))
}

/// Format seconds as an SRT timestamp (`H:MM:SS,mmm`).
///
/// Hours are unbounded and not zero-padded; milliseconds are truncated.
pub fn format_srt_time(seconds: f64) -> String {
    // Truncate to whole milliseconds first, then split; doing the split on
    // the float directly lets representation error leak into the last digit
    // (3661.999 % 1 is just under 0.999).
    let total_millis = (seconds.max(0.0) * 1000.0).floor() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an SRT timestamp back to seconds.
pub fn parse_srt_time(value: &str) -> Result<f64> {
    let caps = srt_time_regex()
        .captures(value.trim())
        .ok_or_else(|| ReelcapError::Format(format!("Invalid SRT time: {}", value)))?;

    let hours: f64 = caps[1].parse().unwrap_or(0.0);
    let minutes: f64 = caps[2].parse().unwrap_or(0.0);
    let seconds: f64 = caps[3].parse().unwrap_or(0.0);
    let millis: f64 = caps[4].parse().unwrap_or(0.0);

    Ok(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

/// Format seconds as an ASS timestamp (`H:MM:SS.cc`).
///
/// Centiseconds are truncated, so the last millisecond digit is dropped.
pub fn format_ass_time(seconds: f64) -> String {
    let total_centis = (seconds.max(0.0) * 100.0).floor() as u64;
    let hours = total_centis / 360_000;
    let minutes = (total_centis % 360_000) / 6_000;
    let secs = (total_centis % 6_000) / 100;
    let centis = total_centis % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}
