pub mod config;
pub mod error;
pub mod export;
pub mod segmenter;
pub mod subtitle;
pub mod timecode;
pub mod timeline;

pub use config::Config;
pub use error::{ReelcapError, Result};
pub use segmenter::{generate_captions, SegmenterConfig};
pub use subtitle::{CaptionPosition, CaptionSegment, CaptionStyle};
pub use timeline::CaptionTimeline;
