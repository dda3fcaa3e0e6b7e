// Polling service - history bootstrap and periodic status polls
use crate::application::dashboard_service::SharedDashboard;
use crate::application::device_repository::DeviceRepository;
use crate::application::render_scheduler::FrameRequester;
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub status_interval: Duration,
    /// Re-fetch the full history this often. `None` fetches it once.
    pub history_refresh: Option<Duration>,
}

pub struct PollingService<R: FrameRequester> {
    repository: Arc<dyn DeviceRepository>,
    dashboard: SharedDashboard<R>,
    settings: PollSettings,
}

impl<R: FrameRequester> Clone for PollingService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            dashboard: self.dashboard.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R: FrameRequester + 'static> PollingService<R> {
    pub fn new(
        repository: Arc<dyn DeviceRepository>,
        dashboard: SharedDashboard<R>,
        settings: PollSettings,
    ) -> Self {
        Self {
            repository,
            dashboard,
            settings,
        }
    }

    /// Fetch and apply the history. Returns whether it was applied.
    pub async fn load_history(&self) -> bool {
        let started = Instant::now();
        match self.repository.fetch_history().await {
            Ok(history) => {
                let mut dashboard = self.dashboard.lock().await;
                dashboard.apply_history(history, Instant::now());
                tracing::debug!("History applied in {:?}", started.elapsed());
                true
            }
            Err(e) => {
                tracing::warn!("History fetch failed, retrying next tick: {:#}", e);
                false
            }
        }
    }

    /// One status round trip. The lock is only taken once the response is in.
    pub async fn poll_status(&self) {
        let result = self.repository.fetch_status().await;
        let mut dashboard = self.dashboard.lock().await;
        match result {
            Ok(status) => {
                dashboard.apply_status(&status, Instant::now());
            }
            Err(e) => dashboard.mark_poll_failed(&format!("{:#}", e)),
        }
    }

    fn history_due(&self, last_loaded: Option<Instant>) -> bool {
        match (last_loaded, self.settings.history_refresh) {
            (None, _) => true,
            (Some(at), Some(every)) => at.elapsed() >= every,
            (Some(_), None) => false,
        }
    }

    /// Poll forever. Each status poll runs as its own task so a slow response
    /// never delays the next tick.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.settings.status_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);
        let mut last_history: Option<Instant> = None;

        tracing::info!(
            "Polling controller every {:?}",
            self.settings.status_interval
        );

        while ticks.next().await.is_some() {
            if self.history_due(last_history) && self.load_history().await {
                last_history = Some(Instant::now());
            }

            let poller = self.clone();
            tokio::spawn(async move {
                poller.poll_status().await;
            });
        }
    }
}
