// Frame ticker - tokio-backed frame callbacks for the render scheduler
use crate::application::render_scheduler::{FrameRequestId, FrameRequester};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A delivered frame callback.
#[derive(Debug, Clone, Copy)]
pub struct FrameTick {
    pub id: FrameRequestId,
    pub at: Instant,
}

/// Delivers each requested frame after one display interval, like a
/// vsync callback. Must be used inside a tokio runtime.
pub struct TokioFrameRequester {
    interval: Duration,
    next_id: u64,
    tx: mpsc::UnboundedSender<FrameTick>,
    pending: HashMap<FrameRequestId, JoinHandle<()>>,
}

impl TokioFrameRequester {
    pub fn new(display_hz: u32) -> (Self, mpsc::UnboundedReceiver<FrameTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let requester = Self {
            interval: Duration::from_secs_f64(1.0 / display_hz.max(1) as f64),
            next_id: 0,
            tx,
            pending: HashMap::new(),
        };
        (requester, rx)
    }

    /// Requests whose callback has not fired or been cancelled yet.
    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }
}

impl FrameRequester for TokioFrameRequester {
    fn request_frame(&mut self) -> FrameRequestId {
        self.pending.retain(|_, handle| !handle.is_finished());

        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        let tx = self.tx.clone();
        let delay = self.interval;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver only goes away at shutdown.
            let _ = tx.send(FrameTick {
                id,
                at: tokio::time::Instant::now().into_std(),
            });
        });
        self.pending.insert(id, handle);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if let Some(handle) = self.pending.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioFrameRequester {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_requested_frame_is_delivered() {
        let (mut requester, mut rx) = TokioFrameRequester::new(60);
        let id = requester.request_frame();

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_frame_is_never_delivered() {
        let (mut requester, mut rx) = TokioFrameRequester::new(60);
        let cancelled = requester.request_frame();
        requester.cancel_frame(cancelled);
        let kept = requester.request_frame();

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.id, kept);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_unique() {
        let (mut requester, _rx) = TokioFrameRequester::new(60);
        let a = requester.request_frame();
        let b = requester.request_frame();
        assert_ne!(a, b);
        assert_eq!(requester.pending_count(), 2);
    }
}
