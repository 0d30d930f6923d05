//! Adaptive-interval polling of a remote render job.
//!
//! One polling loop per poller may be active at a time: `start` supersedes
//! any prior loop by bumping a generation counter, and a superseded loop
//! discards its in-flight response instead of applying it. Transient
//! transport failures retry silently up to a fixed cap before the loop gives
//! up with an aggregated error.

use super::{ExportApi, JobState, JobStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Consecutive transport failures tolerated before the loop stops.
pub const MAX_RETRIES: u32 = 3;

/// Payload size above which the slow tier applies (100 MB).
const LARGE_PAYLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Polling-interval tiers, selected by progress and payload size. All values
/// are floor-clamped to avoid flooding the status endpoint; the defaults are
/// deliberately coarse because render jobs run for minutes.
#[derive(Debug, Clone)]
pub struct PollIntervals {
    /// Quick initial feedback while progress is near zero.
    pub fast: Duration,
    /// Standard interval for most of the job.
    pub normal: Duration,
    /// Large payloads past the halfway mark.
    pub slow: Duration,
    /// Almost done.
    pub final_tier: Duration,
    /// Hard minimum applied to every tier.
    pub floor: Duration,
    /// Fixed delay between transient-failure retries.
    pub retry_delay: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            fast: Duration::from_secs(5),
            normal: Duration::from_secs(10),
            slow: Duration::from_secs(15),
            final_tier: Duration::from_secs(20),
            floor: Duration::from_secs(5),
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl PollIntervals {
    /// Pick the next delay for the given progress and payload-size hint.
    pub fn interval_for(&self, progress: u8, payload_size: u64) -> Duration {
        let interval = if progress < 5 {
            self.fast
        } else if progress < 50 {
            self.normal
        } else if payload_size > LARGE_PAYLOAD_BYTES {
            self.slow
        } else {
            self.final_tier
        };

        interval.max(self.floor)
    }
}

/// Events delivered while a loop runs. The channel closing marks loop
/// termination; a `Failed` status and `Exhausted` are both terminal but
/// distinguish a server-reported failure from transport exhaustion.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Status(JobStatus),
    Exhausted { attempts: u32, last_error: String },
}

/// Bookkeeping owned by one poller instance; never shared across pollers.
#[derive(Debug, Clone, Default)]
pub struct PollerState {
    pub job_id: Option<String>,
    pub last_status: Option<JobStatus>,
    pub is_polling: bool,
    pub retry_count: u32,
    pub file_size_hint: u64,
}

pub struct JobPoller {
    api: Arc<dyn ExportApi>,
    intervals: PollIntervals,
    state: Arc<Mutex<PollerState>>,
    generation: Arc<AtomicU64>,
}

impl JobPoller {
    pub fn new(api: Arc<dyn ExportApi>) -> Self {
        Self::with_intervals(api, PollIntervals::default())
    }

    pub fn with_intervals(api: Arc<dyn ExportApi>, intervals: PollIntervals) -> Self {
        Self {
            api,
            intervals,
            state: Arc::new(Mutex::new(PollerState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start polling a job, superseding any loop already running on this
    /// poller. An optimistic pending status is emitted before the first
    /// request so the caller has something to render immediately.
    pub fn start(&self, job_id: &str, file_size_hint: u64) -> mpsc::UnboundedReceiver<PollEvent> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let initial = JobStatus::initial(job_id);

        {
            let mut state = self.state.lock().expect("poller state poisoned");
            state.job_id = Some(job_id.to_string());
            state.file_size_hint = file_size_hint;
            state.retry_count = 0;
            state.is_polling = true;
            state.last_status = Some(initial.clone());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(PollEvent::Status(initial));

        let api = self.api.clone();
        let intervals = self.intervals.clone();
        let state = self.state.clone();
        let latest_generation = self.generation.clone();
        let job_id = job_id.to_string();

        tokio::spawn(async move {
            run_loop(
                api,
                intervals,
                state,
                latest_generation,
                generation,
                job_id,
                file_size_hint,
                tx,
            )
            .await;
        });

        rx
    }

    /// Cancel any running loop. Idempotent; safe when nothing is polling.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().expect("poller state poisoned");
        state.is_polling = false;
    }

    /// Stop and wipe all bookkeeping back to the idle state.
    pub fn reset(&self) {
        self.stop();
        let mut state = self.state.lock().expect("poller state poisoned");
        *state = PollerState::default();
    }

    pub fn last_status(&self) -> Option<JobStatus> {
        self.state
            .lock()
            .expect("poller state poisoned")
            .last_status
            .clone()
    }

    pub fn is_polling(&self) -> bool {
        self.state.lock().expect("poller state poisoned").is_polling
    }

    pub fn retry_count(&self) -> u32 {
        self.state.lock().expect("poller state poisoned").retry_count
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop(
    api: Arc<dyn ExportApi>,
    intervals: PollIntervals,
    state: Arc<Mutex<PollerState>>,
    latest_generation: Arc<AtomicU64>,
    generation: u64,
    job_id: String,
    file_size_hint: u64,
    tx: mpsc::UnboundedSender<PollEvent>,
) {
    let superseded = || latest_generation.load(Ordering::SeqCst) != generation;

    loop {
        debug!("Polling export status for job {}", job_id);
        let result = api.get_export_status(&job_id).await;

        // A stopped or restarted poller discards late responses.
        if superseded() {
            debug!("Discarding poll response from superseded loop for {}", job_id);
            return;
        }

        match result {
            Ok(mut status) => {
                if status.job_id.is_empty() {
                    status.job_id = job_id.clone();
                }

                {
                    let mut state = state.lock().expect("poller state poisoned");
                    state.retry_count = 0;
                    state.last_status = Some(status.clone());
                }

                let progress = status.progress;
                let terminal = status.status.is_terminal();
                if status.status == JobState::Failed {
                    warn!(
                        "Export job {} failed: {}",
                        job_id,
                        status.error.as_deref().unwrap_or("no error detail")
                    );
                }
                let _ = tx.send(PollEvent::Status(status));

                if terminal {
                    state.lock().expect("poller state poisoned").is_polling = false;
                    return;
                }

                let delay = intervals.interval_for(progress, file_size_hint);
                debug!("Next poll for {} in {:?}", job_id, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                let retries = {
                    let mut state = state.lock().expect("poller state poisoned");
                    state.retry_count += 1;
                    state.retry_count
                };
                warn!("Status poll {} failed (attempt {}): {}", job_id, retries, e);

                if retries >= MAX_RETRIES {
                    let _ = tx.send(PollEvent::Exhausted {
                        attempts: retries,
                        last_error: e.to_string(),
                    });
                    state.lock().expect("poller state poisoned").is_polling = false;
                    return;
                }

                // Retry silently; the last displayed status stays as-is.
                tokio::time::sleep(intervals.retry_delay).await;
            }
        }

        if superseded() {
            return;
        }
    }
}
