use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelcapError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to check progress after {attempts} attempts: {last_error}")]
    PollingExhausted { attempts: u32, last_error: String },

    #[error("Export job failed: {0}")]
    RemoteJob(String),

    #[error("Export service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReelcapError>;
