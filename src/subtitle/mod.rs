pub mod ass;
pub mod srt;

use crate::config::OutputFormat;
use crate::error::{ReelcapError, Result};
use serde::{Deserialize, Serialize};

/// One timed caption with the confidence of whatever produced it.
///
/// Generated captions carry a heuristic confidence (0.9); captions imported
/// from an SRT file are treated as ground truth (1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSegment {
    pub id: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub confidence: f64,
}

impl CaptionSegment {
    /// Build a segment, rejecting degenerate timing up front so it never
    /// has to be handled downstream.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        start_time: f64,
        end_time: f64,
        confidence: f64,
    ) -> Result<Self> {
        if start_time < 0.0 {
            return Err(ReelcapError::Validation(format!(
                "Negative start time: {}",
                start_time
            )));
        }
        if end_time <= start_time {
            return Err(ReelcapError::Validation(format!(
                "End time {} must be after start time {}",
                end_time, start_time
            )));
        }

        Ok(Self {
            id: id.into(),
            text: text.into(),
            start_time,
            end_time,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Rewrite the timing of one caption in place. This is the only
/// field-by-field mutation caption lists support; everything else replaces
/// the list wholesale.
pub fn update_caption_timing(
    captions: &mut [CaptionSegment],
    id: &str,
    start_time: f64,
    end_time: f64,
) -> Result<()> {
    if start_time < 0.0 || end_time <= start_time {
        return Err(ReelcapError::Validation(format!(
            "Invalid timing {}..{} for caption {}",
            start_time, end_time, id
        )));
    }

    let caption = captions
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ReelcapError::Validation(format!("Unknown caption id: {}", id)))?;

    caption.start_time = start_time;
    caption.end_time = end_time;
    Ok(())
}

/// Where captions sit in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Flat style record consumed by the ASS generator and the export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    pub font_family: String,
    pub font_size: u32,
    pub font_weight: u32,
    /// `#RRGGBB` hex.
    pub color: String,
    /// `#RRGGBB` hex, reused as outline and back color in ASS output.
    pub background_color: String,
    pub position: CaptionPosition,
    pub padding: u32,
    pub border_radius: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 48,
            font_weight: 700,
            color: "#FFFFFF".to_string(),
            background_color: "#000000".to_string(),
            position: CaptionPosition::Bottom,
            padding: 16,
            border_radius: 8,
        }
    }
}

pub trait SubtitleFormatter {
    fn format(&self, captions: &[CaptionSegment]) -> String;
    fn extension(&self) -> &'static str;
}

pub fn create_formatter(format: OutputFormat, style: &CaptionStyle) -> Box<dyn SubtitleFormatter> {
    match format {
        OutputFormat::Srt => Box::new(srt::SrtFormatter),
        OutputFormat::Ass => Box::new(ass::AssFormatter::new(style.clone())),
    }
}
