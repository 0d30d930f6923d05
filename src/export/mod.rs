pub mod api;
pub mod orchestrator;
pub mod payload;
pub mod poller;

pub use api::{ExportApi, HttpExportClient};
pub use orchestrator::{ExportArtifact, ExportOrchestrator, ExportOutcome};
pub use poller::{JobPoller, PollEvent, PollIntervals, PollerState};

use crate::subtitle::{CaptionSegment, CaptionStyle};
use serde::{Deserialize, Serialize};

/// Remote job lifecycle as the render service reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Processing => write!(f, "processing"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// One status snapshot fetched from the render service.
///
/// The API reports the job id under `id`; the alias keeps both spellings
/// decodable and the poller fills in its own id when the field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default, alias = "id")]
    pub job_id: String,
    pub status: JobState,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_remaining: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl JobStatus {
    /// Synthetic status emitted before the first round trip so callers have
    /// something to render immediately.
    pub fn initial(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            status: JobState::Pending,
            progress: 0,
            message: Some("Starting export...".to_string()),
            error: None,
            estimated_time_remaining: None,
            processing_speed: None,
            output_path: None,
        }
    }
}

/// Standard response envelope the backend wraps every payload in.
///
/// No `serde(default)` on `data`: serde already decodes an absent `Option`
/// as `None`, and the attribute would put a `T: Default` bound on the
/// derived impl, which payload types like [`JobStatus`] do not satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Burn-in render parameters sent with a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            format: "mp4".to_string(),
        }
    }
}

/// Everything the render service needs to burn captions into a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub video_id: String,
    pub captions: Vec<CaptionSegment>,
    pub style: CaptionStyle,
    pub options: OutputOptions,
}
