//! Transcript segmentation under a reading-speed model.
//!
//! A single deterministic pass: the transcript is chunked by word count,
//! then each chunk gets a window sized by how long it takes to read, clamped
//! between the configured minimum and maximum and never past the total
//! duration. This is a heuristic, not audio alignment; accuracy is bounded
//! by the words-per-minute assumption.

use crate::subtitle::CaptionSegment;
use tracing::debug;

/// Confidence assigned to generated captions, below the 1.0 of imported SRT.
const GENERATED_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Longest a single caption may stay on screen, seconds.
    pub max_segment_duration: f64,
    /// Shortest window a caption gets regardless of word count, seconds.
    pub min_segment_duration: f64,
    /// Assumed speaking rate for the reading-time estimate.
    pub words_per_minute: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_segment_duration: 5.0,
            min_segment_duration: 1.0,
            words_per_minute: 150.0,
        }
    }
}

/// Split a transcript into timed caption segments covering `total_duration`.
///
/// Chunks whose window would be zero-length (the cursor already reached the
/// total duration) are dropped, along with everything after them.
pub fn generate_captions(
    transcript: &str,
    total_duration: f64,
    config: &SegmenterConfig,
) -> Vec<CaptionSegment> {
    if transcript.trim().is_empty() {
        return Vec::new();
    }

    let chunks = split_into_chunks(transcript, total_duration, config);
    debug!("Split transcript into {} chunks", chunks.len());

    let mut captions = Vec::with_capacity(chunks.len());
    let mut cursor = 0.0;

    for (index, chunk) in chunks.iter().enumerate() {
        let reading_time = reading_time(chunk, config).min(config.max_segment_duration);
        let end = (cursor + reading_time).min(total_duration);

        if end > cursor {
            captions.push(CaptionSegment {
                id: format!("caption-{}", index),
                text: chunk.clone(),
                start_time: cursor,
                end_time: end,
                confidence: GENERATED_CONFIDENCE,
            });
        }

        cursor = end;
    }

    debug!("Generated {} captions over {:.1}s", captions.len(), cursor);
    captions
}

/// Chunk the transcript into consecutive word groups sized so the chunk
/// count roughly matches `ceil(duration / max_segment_duration)`.
fn split_into_chunks(transcript: &str, total_duration: f64, config: &SegmenterConfig) -> Vec<String> {
    let words: Vec<&str> = transcript.split_whitespace().collect();
    let total_words = words.len();

    let target_segments = ((total_duration / config.max_segment_duration).ceil() as usize).max(1);
    let words_per_segment = total_words.div_ceil(target_segments).max(1);

    words
        .chunks(words_per_segment)
        .map(|chunk| chunk.join(" "))
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// How long a chunk needs on screen, floored at the minimum duration.
fn reading_time(text: &str, config: &SegmenterConfig) -> f64 {
    let word_count = text.split_whitespace().count() as f64;
    let minutes = word_count / config.words_per_minute;
    (minutes * 60.0).max(config.min_segment_duration)
}
