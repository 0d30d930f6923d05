//! Mock API tests for the export backend client and orchestration.
//!
//! These tests run the HTTP client against a local wiremock server instead
//! of a real render backend.

use reelcap::export::poller::{JobPoller, PollEvent, PollIntervals};
use reelcap::export::{
    ExportApi, ExportArtifact, ExportOrchestrator, ExportRequest, HttpExportClient, JobState,
    OutputOptions,
};
use reelcap::subtitle::{CaptionSegment, CaptionStyle};
use reelcap::ReelcapError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_request() -> ExportRequest {
    ExportRequest {
        video_id: "vid-1".to_string(),
        captions: vec![CaptionSegment::new("c1", "Hello", 0.0, 2.0, 0.9).unwrap()],
        style: CaptionStyle::default(),
        options: OutputOptions::default(),
    }
}

fn fast_intervals() -> PollIntervals {
    PollIntervals {
        fast: Duration::from_millis(10),
        normal: Duration::from_millis(10),
        slow: Duration::from_millis(10),
        final_tier: Duration::from_millis(10),
        floor: Duration::from_millis(1),
        retry_delay: Duration::from_millis(5),
    }
}

// ============================================================================
// HTTP Client Tests
// ============================================================================

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_export_returns_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/export/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "jobId": "job-42" }
            })))
            .mount(&server)
            .await;

        let client = HttpExportClient::new(server.uri());
        let job_id = client.submit_export(&sample_request()).await.unwrap();
        assert_eq!(job_id, "job-42");
    }

    #[tokio::test]
    async fn test_submit_export_envelope_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/export/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "video not found"
            })))
            .mount(&server)
            .await;

        let client = HttpExportClient::new(server.uri());
        let err = client.submit_export(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ReelcapError::Transport(_)));
        assert!(err.to_string().contains("video not found"));
    }

    #[tokio::test]
    async fn test_submit_export_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/export/submit"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpExportClient::new(server.uri());
        let err = client.submit_export(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_get_export_status_maps_id_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "id": "job-42",
                    "status": "processing",
                    "progress": 55,
                    "estimatedTimeRemaining": 12.5,
                    "processingSpeed": 2.5
                }
            })))
            .mount(&server)
            .await;

        let client = HttpExportClient::new(server.uri());
        let status = client.get_export_status("job-42").await.unwrap();

        assert_eq!(status.job_id, "job-42");
        assert_eq!(status.status, JobState::Processing);
        assert_eq!(status.progress, 55);
        assert_eq!(status.estimated_time_remaining, Some(12.5));
        assert_eq!(status.processing_speed, Some(2.5));
    }

    #[tokio::test]
    async fn test_get_export_status_missing_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true
            })))
            .mount(&server)
            .await;

        let client = HttpExportClient::new(server.uri());
        assert!(client.get_export_status("job-42").await.is_err());
    }

    #[tokio::test]
    async fn test_download_artifact_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export/job-42/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4 bytes".to_vec()))
            .mount(&server)
            .await;

        let client = HttpExportClient::new(server.uri());
        let bytes = client.download_artifact("job-42").await.unwrap();
        assert_eq!(bytes, b"mp4 bytes");
    }
}

// ============================================================================
// Poller Over HTTP Tests
// ============================================================================

mod poller_tests {
    use super::*;

    #[tokio::test]
    async fn test_poller_reaches_completion_over_http() {
        let server = MockServer::start().await;
        // First poll reports processing, every later poll reports done.
        Mock::given(method("GET"))
            .and(path("/export/status/job-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "id": "job-9", "status": "processing", "progress": 30 }
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "id": "job-9", "status": "completed", "progress": 100 }
            })))
            .mount(&server)
            .await;

        let api = Arc::new(HttpExportClient::new(server.uri()));
        let poller = JobPoller::with_intervals(api, fast_intervals());

        let mut rx = poller.start("job-9", 0);
        let mut last = None;
        while let Some(event) = rx.recv().await {
            if let PollEvent::Status(status) = event {
                last = Some(status);
            }
        }

        let last = last.unwrap();
        assert_eq!(last.status, JobState::Completed);
        assert_eq!(last.progress, 100);
        assert!(!poller.is_polling());
    }

    #[tokio::test]
    async fn test_poller_exhausts_against_dead_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-9"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = Arc::new(HttpExportClient::new(server.uri()));
        let poller = JobPoller::with_intervals(api, fast_intervals());

        let mut rx = poller.start("job-9", 0);
        let mut exhausted = None;
        while let Some(event) = rx.recv().await {
            if let PollEvent::Exhausted { attempts, .. } = event {
                exhausted = Some(attempts);
            }
        }

        assert_eq!(exhausted, Some(3));
    }
}

// ============================================================================
// Orchestrator End-To-End Tests
// ============================================================================

mod orchestrator_tests {
    use super::*;

    #[tokio::test]
    async fn test_export_end_to_end_with_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/export/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "jobId": "job-5" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "id": "job-5",
                    "status": "completed",
                    "progress": 100,
                    "outputPath": "https://cdn.example/job-5.mp4"
                }
            })))
            .mount(&server)
            .await;

        let api = Arc::new(HttpExportClient::new(server.uri()));
        let orchestrator = ExportOrchestrator::new(api).with_intervals(fast_intervals());

        let mut progress_seen = Vec::new();
        let outcome = orchestrator
            .export(&sample_request(), 0, |s| progress_seen.push(s.progress))
            .await
            .unwrap();

        assert_eq!(outcome.job_id, "job-5");
        assert_eq!(
            outcome.artifact,
            ExportArtifact::Remote {
                url: "https://cdn.example/job-5.mp4".to_string()
            }
        );
        // The synthetic initial status arrives before any network response.
        assert_eq!(progress_seen.first(), Some(&0));
    }

    #[tokio::test]
    async fn test_export_downloads_artifact_when_no_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/export/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "jobId": "job-5" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "id": "job-5", "status": "completed", "progress": 100 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/export/job-5/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"rendered".to_vec()))
            .mount(&server)
            .await;

        let api = Arc::new(HttpExportClient::new(server.uri()));
        let orchestrator = ExportOrchestrator::new(api)
            .with_intervals(fast_intervals())
            .with_output_dir(dir.path());

        let outcome = orchestrator.export(&sample_request(), 0, |_| {}).await.unwrap();

        match outcome.artifact {
            ExportArtifact::File { path } => {
                assert_eq!(std::fs::read(path).unwrap(), b"rendered");
            }
            other => panic!("expected local file, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_export_surfaces_server_reported_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/export/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "jobId": "job-5" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/export/status/job-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "id": "job-5",
                    "status": "failed",
                    "progress": 60,
                    "error": "ffmpeg exited with code 1"
                }
            })))
            .mount(&server)
            .await;

        let api = Arc::new(HttpExportClient::new(server.uri()));
        let orchestrator = ExportOrchestrator::new(api).with_intervals(fast_intervals());

        let err = orchestrator.export(&sample_request(), 0, |_| {}).await.unwrap_err();
        assert!(matches!(err, ReelcapError::RemoteJob(_)));
        assert!(err.to_string().contains("ffmpeg exited with code 1"));
    }

    #[tokio::test]
    async fn test_submit_against_unreachable_backend_is_unavailable() {
        // Nothing listens on this port; the connection itself fails.
        let api = Arc::new(HttpExportClient::new("http://127.0.0.1:1/api"));
        let orchestrator = ExportOrchestrator::new(api);

        let err = orchestrator.submit(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ReelcapError::Unavailable(_)));
    }
}
