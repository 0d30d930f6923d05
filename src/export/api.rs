//! The remote render-service seam.
//!
//! The engine never owns transport policy beyond interpreting the response
//! envelope; everything behind [`ExportApi`] is an external collaborator and
//! tests substitute scripted implementations.

use super::{ApiResponse, ExportRequest, JobStatus};
use crate::error::{ReelcapError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[async_trait]
pub trait ExportApi: Send + Sync {
    /// Submit a burn-in job; returns the job id on acceptance.
    async fn submit_export(&self, request: &ExportRequest) -> Result<String>;

    /// Fetch the current status snapshot for a job.
    async fn get_export_status(&self, job_id: &str) -> Result<JobStatus>;

    /// Fetch the finished artifact as bytes.
    async fn download_artifact(&self, job_id: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitData {
    job_id: String,
}

/// HTTP implementation over the backend's JSON envelope.
pub struct HttpExportClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Unwrap the `{success, data, error}` envelope into the payload.
    fn unwrap_envelope<T>(response: ApiResponse<T>, what: &str) -> Result<T> {
        if !response.success {
            return Err(ReelcapError::Transport(
                response
                    .error
                    .unwrap_or_else(|| format!("Failed to {}", what)),
            ));
        }
        response
            .data
            .ok_or_else(|| ReelcapError::Transport(format!("No data received for {}", what)))
    }
}

#[async_trait]
impl ExportApi for HttpExportClient {
    async fn submit_export(&self, request: &ExportRequest) -> Result<String> {
        let response = self
            .client
            .post(self.url("/export/submit"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!("Export submit response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReelcapError::Transport(format!(
                "Export submission failed ({}): {}",
                status, body
            )));
        }

        let envelope: ApiResponse<SubmitData> = response.json().await?;
        Ok(Self::unwrap_envelope(envelope, "submit export")?.job_id)
    }

    async fn get_export_status(&self, job_id: &str) -> Result<JobStatus> {
        let response = self
            .client
            .get(self.url(&format!("/export/status/{}", job_id)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReelcapError::Transport(format!(
                "Status request failed ({})",
                status
            )));
        }

        let envelope: ApiResponse<JobStatus> = response.json().await?;
        Self::unwrap_envelope(envelope, "get export status")
    }

    async fn download_artifact(&self, job_id: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(&format!("/export/{}/download", job_id)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReelcapError::Transport(format!(
                "Artifact download failed ({})",
                status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
