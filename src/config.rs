use crate::error::{ReelcapError, Result};
use crate::segmenter::SegmenterConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Srt,
    Ass,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Ass => write!(f, "ass"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "ass" | "ssa" => Ok(OutputFormat::Ass),
            _ => Err(format!("Unknown format: {}. Use 'srt' or 'ass'", s)),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Ass => "ass",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the export backend.
    pub backend_url: String,
    pub default_format: OutputFormat,
    pub max_segment_duration: f64,
    pub min_segment_duration: f64,
    pub words_per_minute: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3001/api".to_string(),
            default_format: OutputFormat::default(),
            max_segment_duration: 5.0,
            min_segment_duration: 1.0,
            words_per_minute: 150.0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(url) = std::env::var("REELCAP_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Ok(format) = std::env::var("REELCAP_DEFAULT_FORMAT") {
            if let Ok(f) = format.parse() {
                config.default_format = f;
            }
        }
        if let Ok(wpm) = std::env::var("REELCAP_WORDS_PER_MINUTE") {
            if let Ok(w) = wpm.parse() {
                config.words_per_minute = w;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(ReelcapError::Config(
                "Backend URL must not be empty. Set REELCAP_BACKEND_URL or backend_url in config.toml".to_string(),
            ));
        }
        if self.min_segment_duration <= 0.0 || self.max_segment_duration <= self.min_segment_duration
        {
            return Err(ReelcapError::Config(format!(
                "Segment durations must satisfy 0 < min < max (got min={}, max={})",
                self.min_segment_duration, self.max_segment_duration
            )));
        }
        if self.words_per_minute <= 0.0 {
            return Err(ReelcapError::Config(
                "Words per minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            max_segment_duration: self.max_segment_duration,
            min_segment_duration: self.min_segment_duration,
            words_per_minute: self.words_per_minute,
        }
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reelcap").join("config.toml"))
    }
}
