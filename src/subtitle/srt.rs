//! SRT parsing and serialization.
//!
//! Decoding is lossy-safe: a structurally broken block is skipped with a
//! warning rather than failing the whole file, so a damaged subtitle file
//! degrades to fewer cues instead of none.

use super::{CaptionSegment, SubtitleFormatter};
use crate::error::{ReelcapError, Result};
use crate::timecode::{format_srt_time, parse_srt_time};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Import size cap for SRT files (10 MB).
const MAX_IMPORT_SIZE: u64 = 10 * 1024 * 1024;

/// One parsed SRT block. Transient: the index read here is discarded on
/// serialize, which always re-numbers 1..N.
#[derive(Debug, Clone, PartialEq)]
pub struct SrtCue {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

fn time_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+:\d{2}:\d{2},\d{3})\s*-->\s*(\d+:\d{2}:\d{2},\d{3})")
            .expect("Invalid regex")
    })
}

/// Parse SRT content into cues, in block order. Never errors on malformed
/// blocks; they are dropped.
pub fn parse_srt_content(content: &str) -> Vec<SrtCue> {
    let mut cues = Vec::new();

    for block in split_blocks(content) {
        if let Some(cue) = parse_block(&block) {
            cues.push(cue);
        }
    }

    debug!("Parsed {} SRT cues", cues.len());
    cues
}

/// Split on blank lines (a newline, optional whitespace, another newline).
fn split_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.trim().lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

fn parse_block(block: &str) -> Option<SrtCue> {
    let lines: Vec<&str> = block.trim().lines().collect();

    if lines.len() < 3 {
        warn!("Invalid SRT block: {:?}", block);
        return None;
    }

    let index: usize = match lines[0].trim().parse() {
        Ok(n) => n,
        Err(_) => {
            warn!("Invalid SRT cue index: {:?}", lines[0]);
            return None;
        }
    };

    let caps = match time_line_regex().captures(lines[1]) {
        Some(caps) => caps,
        None => {
            warn!("Invalid SRT time line: {:?}", lines[1]);
            return None;
        }
    };

    // The captures already match the time pattern, so these cannot fail.
    let start_time = parse_srt_time(&caps[1]).ok()?;
    let end_time = parse_srt_time(&caps[2]).ok()?;

    Some(SrtCue {
        index,
        start_time,
        end_time,
        text: lines[2..].join("\n").trim().to_string(),
    })
}

/// Convert imported cues to caption segments. SRT files are treated as
/// ground truth, so confidence is 1.0.
pub fn captions_from_cues(cues: &[SrtCue]) -> Vec<CaptionSegment> {
    cues.iter()
        .enumerate()
        .map(|(i, cue)| CaptionSegment {
            id: format!("srt-caption-{}-{}", cue.index, i),
            text: cue.text.clone(),
            start_time: cue.start_time,
            end_time: cue.end_time,
            confidence: 1.0,
        })
        .collect()
}

/// Check an SRT file path before reading it: extension and size cap.
pub fn validate_srt_file(path: &std::path::Path) -> Result<()> {
    let is_srt = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("srt"))
        .unwrap_or(false);
    if !is_srt {
        return Err(ReelcapError::Format(format!(
            "Not an SRT file: {}",
            path.display()
        )));
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_IMPORT_SIZE {
        return Err(ReelcapError::Format(format!(
            "SRT file too large: {} bytes (max {} bytes)",
            size, MAX_IMPORT_SIZE
        )));
    }

    Ok(())
}

pub struct SrtFormatter;

impl SubtitleFormatter for SrtFormatter {
    /// Serialize captions in list order, re-indexed 1..N. Callers sort if
    /// they need time order; no re-sorting happens here.
    fn format(&self, captions: &[CaptionSegment]) -> String {
        captions
            .iter()
            .enumerate()
            .map(|(i, caption)| {
                format!(
                    "{}\n{} --> {}\n{}\n",
                    i + 1,
                    format_srt_time(caption.start_time),
                    format_srt_time(caption.end_time),
                    caption.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extension(&self) -> &'static str {
        "srt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(id: &str, start: f64, end: f64, text: &str) -> CaptionSegment {
        CaptionSegment::new(id, text, start, end, 0.9).unwrap()
    }

    #[test]
    fn test_format_srt() {
        let captions = vec![
            caption("1", 1.5, 4.0, "Hello, world!"),
            caption("2", 4.5, 7.0, "This is a test."),
        ];

        let output = SrtFormatter.format(&captions);
        assert_eq!(
            output,
            "1\n0:00:01,500 --> 0:00:04,000\nHello, world!\n\n2\n0:00:04,500 --> 0:00:07,000\nThis is a test.\n"
        );
    }

    #[test]
    fn test_format_reindexes() {
        // Ids are ignored; output indices are always sequential from 1.
        let captions = vec![caption("caption-42", 0.0, 1.0, "First")];
        let output = SrtFormatter.format(&captions);
        assert!(output.starts_with("1\n"));
    }

    #[test]
    fn test_parse_basic() {
        let content = "1\n00:00:01,500 --> 00:00:04,000\nHello\n\n2\n00:00:04,500 --> 00:00:07,000\nWorld";
        let cues = parse_srt_content(content);

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].start_time, 1.5);
        assert_eq!(cues[0].end_time, 4.0);
        assert_eq!(cues[0].text, "Hello");
        assert_eq!(cues[1].text, "World");
    }

    #[test]
    fn test_parse_multiline_text() {
        let content = "1\n00:00:00,000 --> 00:00:02,000\nLine one\nLine two";
        let cues = parse_srt_content(content);

        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Line one\nLine two");
    }

    #[test]
    fn test_parse_skips_bad_index() {
        let content = "abc\n00:00:00,000 --> 00:00:02,000\nDropped\n\n2\n00:00:02,000 --> 00:00:04,000\nKept";
        let cues = parse_srt_content(content);

        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Kept");
    }

    #[test]
    fn test_parse_skips_bad_time_line() {
        let content = "1\nnot a time line\nDropped\n\n2\n00:00:02,000 --> 00:00:04,000\nKept";
        let cues = parse_srt_content(content);

        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 2);
    }

    #[test]
    fn test_parse_skips_short_block() {
        let content = "1\n00:00:00,000 --> 00:00:02,000";
        assert!(parse_srt_content(content).is_empty());
    }

    #[test]
    fn test_parse_keeps_block_order() {
        // Out-of-time-order cues stay in block order; no re-sorting.
        let content = "1\n00:00:05,000 --> 00:00:07,000\nLater\n\n2\n00:00:01,000 --> 00:00:03,000\nEarlier";
        let cues = parse_srt_content(content);

        assert_eq!(cues[0].text, "Later");
        assert_eq!(cues[1].text, "Earlier");
    }

    #[test]
    fn test_round_trip_within_a_millisecond() {
        let captions = vec![
            caption("1", 1.25, 4.75, "Hello, world!"),
            caption("2", 4.75, 7.5, "Multi\nline"),
        ];

        let cues = parse_srt_content(&SrtFormatter.format(&captions));
        assert_eq!(cues.len(), 2);
        for (cue, original) in cues.iter().zip(&captions) {
            assert!((cue.start_time - original.start_time).abs() < 0.001);
            assert!((cue.end_time - original.end_time).abs() < 0.001);
            assert_eq!(cue.text, original.text);
        }
    }

    #[test]
    fn test_captions_from_cues_are_ground_truth() {
        let cues = vec![SrtCue {
            index: 3,
            start_time: 1.0,
            end_time: 2.0,
            text: "Imported".to_string(),
        }];

        let captions = captions_from_cues(&cues);
        assert_eq!(captions[0].confidence, 1.0);
        assert_eq!(captions[0].id, "srt-caption-3-0");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_srt_content("").is_empty());
        assert!(parse_srt_content("   \n\n  ").is_empty());
    }
}
