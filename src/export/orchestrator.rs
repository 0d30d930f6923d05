//! Drives a burn-in export from submission to a downloadable artifact.

use super::poller::{JobPoller, PollEvent, PollIntervals};
use super::{ExportApi, ExportRequest, JobState, JobStatus};
use crate::error::{ReelcapError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a finished export ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportArtifact {
    /// The server supplied a redirect URL; nothing was downloaded.
    Remote { url: String },
    /// The artifact bytes were fetched and saved locally.
    File { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub job_id: String,
    pub artifact: ExportArtifact,
    pub final_status: JobStatus,
}

pub struct ExportOrchestrator {
    api: Arc<dyn ExportApi>,
    intervals: PollIntervals,
    output_dir: PathBuf,
}

impl ExportOrchestrator {
    pub fn new(api: Arc<dyn ExportApi>) -> Self {
        Self {
            api,
            intervals: PollIntervals::default(),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// Directory where locally saved artifacts land.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Submit a burn-in job. A connection-level failure becomes
    /// `Unavailable` so the caller knows to fall back to local SRT export
    /// instead of treating it as a job failure.
    pub async fn submit(&self, request: &ExportRequest) -> Result<String> {
        match self.api.submit_export(request).await {
            Ok(job_id) => {
                info!("Export job accepted: {}", job_id);
                Ok(job_id)
            }
            Err(ReelcapError::Http(e)) if e.is_connect() || e.is_timeout() => {
                Err(ReelcapError::Unavailable(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Submit and poll to completion, reporting every status snapshot to
    /// `on_progress`. A failed submission is never retried here; the caller
    /// decides whether to resubmit.
    pub async fn export<F>(
        &self,
        request: &ExportRequest,
        payload_size_hint: u64,
        on_progress: F,
    ) -> Result<ExportOutcome>
    where
        F: FnMut(&JobStatus),
    {
        let job_id = self.submit(request).await?;
        self.track(&job_id, payload_size_hint, on_progress).await
    }

    /// Poll an already-submitted job to completion and resolve its artifact.
    pub async fn track<F>(
        &self,
        job_id: &str,
        payload_size_hint: u64,
        mut on_progress: F,
    ) -> Result<ExportOutcome>
    where
        F: FnMut(&JobStatus),
    {
        // One poller per in-flight export; the loop ends when the channel
        // closes after a terminal event.
        let poller = JobPoller::with_intervals(self.api.clone(), self.intervals.clone());
        let mut rx = poller.start(job_id, payload_size_hint);

        let mut final_status: Option<JobStatus> = None;
        while let Some(event) = rx.recv().await {
            match event {
                PollEvent::Status(status) => {
                    on_progress(&status);
                    match status.status {
                        JobState::Completed => {
                            final_status = Some(status);
                            break;
                        }
                        JobState::Failed => {
                            let detail = status
                                .error
                                .unwrap_or_else(|| "Export failed".to_string());
                            return Err(ReelcapError::RemoteJob(detail));
                        }
                        _ => {}
                    }
                }
                PollEvent::Exhausted { attempts, last_error } => {
                    // Distinct from Transport so callers can tell "polling
                    // gave up" apart from a failed submit or download.
                    return Err(ReelcapError::PollingExhausted { attempts, last_error });
                }
            }
        }

        let final_status = final_status.ok_or_else(|| {
            ReelcapError::Transport("Polling ended without a terminal status".to_string())
        })?;

        let artifact = self.resolve_artifact(job_id, &final_status).await?;
        Ok(ExportOutcome {
            job_id: job_id.to_string(),
            artifact,
            final_status,
        })
    }

    /// Prefer the server's redirect URL; otherwise fetch the bytes and save
    /// them next to the configured output directory.
    async fn resolve_artifact(&self, job_id: &str, status: &JobStatus) -> Result<ExportArtifact> {
        if let Some(url) = status.output_path.clone() {
            debug!("Export {} resolved to remote artifact {}", job_id, url);
            return Ok(ExportArtifact::Remote { url });
        }

        warn!("Export {} has no output path; downloading artifact", job_id);
        let bytes = self.api.download_artifact(job_id).await?;
        let path = self.output_dir.join(format!("export-{}.mp4", job_id));
        tokio::fs::write(&path, &bytes).await?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(ExportArtifact::File { path })
    }
}

/// Local SRT fallback used when the render service is unavailable, so
/// caption export is never fully blocked by backend downtime.
pub fn write_fallback_srt(captions: &[crate::subtitle::CaptionSegment], path: &Path) -> Result<()> {
    use crate::subtitle::{srt::SrtFormatter, SubtitleFormatter};

    let content = SrtFormatter.format(captions);
    std::fs::write(path, content)?;
    info!("Wrote fallback SRT to {}", path.display());
    Ok(())
}
