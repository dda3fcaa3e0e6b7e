// Render scheduler - frame pacing for the animated views
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Platform frame callback: deliver one frame some time after the request.
pub trait FrameRequester: Send {
    fn request_frame(&mut self) -> FrameRequestId;

    fn cancel_frame(&mut self, id: FrameRequestId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

pub struct RenderScheduler<R: FrameRequester> {
    requester: R,
    state: SchedulerState,
    pending: Option<FrameRequestId>,
    last_frame: Option<Instant>,
    min_interval: Duration,
}

impl<R: FrameRequester> RenderScheduler<R> {
    pub fn new(requester: R, target_fps: u32) -> Self {
        Self {
            requester,
            state: SchedulerState::Stopped,
            pending: None,
            last_frame: None,
            min_interval: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    #[cfg(test)]
    pub fn requester(&self) -> &R {
        &self.requester
    }

    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.state = SchedulerState::Running;
        self.last_frame = Some(now);
        self.pending = Some(self.requester.request_frame());
        tracing::debug!("Render scheduler started");
    }

    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.state = SchedulerState::Stopped;
        if let Some(id) = self.pending.take() {
            self.requester.cancel_frame(id);
        }
        self.last_frame = None;
        tracing::debug!("Render scheduler stopped");
    }

    /// Handle a delivered frame. Returns the elapsed time to animate by when
    /// this frame should do work.
    pub fn on_frame(&mut self, id: FrameRequestId, now: Instant) -> Option<Duration> {
        if !self.is_running() || self.pending != Some(id) {
            return None;
        }
        self.pending = Some(self.requester.request_frame());

        let last = self.last_frame.unwrap_or(now);
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval {
            return None;
        }
        self.last_frame = Some(now);
        Some(elapsed)
    }
}
