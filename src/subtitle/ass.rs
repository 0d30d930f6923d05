//! ASS/SSA document generation for burned-in export.
//!
//! Write-only: the render service consumes this as the styling source for
//! its burn-in filter. Defaults target portrait video (1080x1920).

use super::{CaptionPosition, CaptionSegment, CaptionStyle, SubtitleFormatter};
use crate::timecode::format_ass_time;

const DEFAULT_PLAY_RES_X: u32 = 1080;
const DEFAULT_PLAY_RES_Y: u32 = 1920;

/// Fully opaque black, used as the fixed secondary color.
const SECONDARY_COLOR: &str = "&H000000FF&";

/// Convert `#RRGGBB` to the ASS `&HBBGGRR&` form. ASS stores colors in BGR
/// order, so the R and B octets swap while G stays put.
pub fn hex_to_ass_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    let rr = hex.get(0..2).unwrap_or("00");
    let gg = hex.get(2..4).unwrap_or("00");
    let bb = hex.get(4..6).unwrap_or("00");
    format!("&H{}{}{}&", bb, gg, rr)
}

/// Map position to the ASS numpad alignment code. Anything that is not top
/// or center renders at the bottom.
pub fn position_to_alignment(position: CaptionPosition) -> u8 {
    match position {
        CaptionPosition::Top => 8,
        CaptionPosition::Center => 5,
        CaptionPosition::Bottom => 2,
    }
}

/// Escape caption text for a Dialogue line. Newlines become the ASS `\N`
/// break token before commas are escaped; the other order would mangle the
/// backslash sequences the newline substitution introduces.
fn escape_dialogue_text(text: &str) -> String {
    text.replace('\n', "\\N").replace(',', "\\,")
}

pub struct AssFormatter {
    style: CaptionStyle,
    play_res_x: u32,
    play_res_y: u32,
}

impl AssFormatter {
    pub fn new(style: CaptionStyle) -> Self {
        Self {
            style,
            play_res_x: DEFAULT_PLAY_RES_X,
            play_res_y: DEFAULT_PLAY_RES_Y,
        }
    }

    /// Override the script resolution (defaults to 1080x1920 portrait).
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.play_res_x = width;
        self.play_res_y = height;
        self
    }

    fn header(&self) -> String {
        let alignment = position_to_alignment(self.style.position);
        let primary = hex_to_ass_color(&self.style.color);
        let back = hex_to_ass_color(&self.style.background_color);

        [
            "[Script Info]".to_string(),
            "ScriptType: v4.00+".to_string(),
            "Collisions: Normal".to_string(),
            "WrapStyle: 2".to_string(),
            format!("PlayResX: {}", self.play_res_x),
            format!("PlayResY: {}", self.play_res_y),
            String::new(),
            "[V4+ Styles]".to_string(),
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, \
             Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
             Alignment, MarginL, MarginR, MarginV, Encoding"
                .to_string(),
            format!(
                "Style: Default,{},{},{},{},{},{},0,0,0,0,100,100,0,0,1,0,0,{},20,20,20,0",
                self.style.font_family,
                self.style.font_size,
                primary,
                SECONDARY_COLOR,
                back,
                back,
                alignment
            ),
            String::new(),
            "[Events]".to_string(),
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
                .to_string(),
        ]
        .join("\n")
    }
}

impl SubtitleFormatter for AssFormatter {
    fn format(&self, captions: &[CaptionSegment]) -> String {
        let events: Vec<String> = captions
            .iter()
            .map(|c| {
                format!(
                    "Dialogue: 0,{},{},Default,,0,0,0,,{}",
                    format_ass_time(c.start_time),
                    format_ass_time(c.end_time),
                    escape_dialogue_text(&c.text)
                )
            })
            .collect();

        format!("{}\n{}\n", self.header(), events.join("\n"))
    }

    fn extension(&self) -> &'static str {
        "ass"
    }
}
