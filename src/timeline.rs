//! Playback-time to active-caption resolution with anti-flicker hysteresis.
//!
//! Adjacent segments often leave sub-second gaps between their windows.
//! Clearing the display the instant a window ends makes captions blink off
//! and back on at every gap, so the last caption is held for a short grace
//! period and only cleared if no new match shows up in time.

use crate::subtitle::CaptionSegment;
use std::time::{Duration, Instant};

/// How long a caption lingers after its window ends with nothing to replace it.
pub const CLEAR_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct CaptionTimeline {
    active: Option<CaptionSegment>,
    /// Wall-clock deadline after which an unmatched active caption clears.
    pending_clear_at: Option<Instant>,
}

impl CaptionTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the caption to display at `current_time` (playback seconds).
    ///
    /// Captions are scanned linearly in list order; ordering and
    /// overlap-freedom are advisory, the first match wins.
    pub fn resolve(&mut self, current_time: f64, captions: &[CaptionSegment]) -> Option<&CaptionSegment> {
        self.resolve_at(current_time, captions, Instant::now())
    }

    /// Like [`resolve`](Self::resolve) with the wall clock supplied by the
    /// caller, so hysteresis is testable without sleeping.
    pub fn resolve_at(
        &mut self,
        current_time: f64,
        captions: &[CaptionSegment],
        now: Instant,
    ) -> Option<&CaptionSegment> {
        let matched = captions
            .iter()
            .find(|c| current_time >= c.start_time && current_time <= c.end_time);

        match matched {
            Some(caption) => {
                // A match always cancels a pending clear, whether it is the
                // held caption reappearing or a different one taking over.
                self.pending_clear_at = None;
                if self.active.as_ref().map(|a| a.id.as_str()) != Some(caption.id.as_str()) {
                    self.active = Some(caption.clone());
                }
            }
            None => {
                if self.active.is_some() {
                    match self.pending_clear_at {
                        None => self.pending_clear_at = Some(now + CLEAR_DELAY),
                        Some(deadline) if now >= deadline => {
                            self.active = None;
                            self.pending_clear_at = None;
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|c| c.id.as_str())
    }

    /// Drop any held caption immediately, e.g. on seek or caption reload.
    pub fn clear(&mut self) {
        self.active = None;
        self.pending_clear_at = None;
    }
}
