// Repository trait for smoker controller access
use crate::domain::device::{History, StatusSnapshot};
use async_trait::async_trait;

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Fetch the retained sample and event history, decoded to real units
    async fn fetch_history(&self) -> anyhow::Result<History>;

    /// Fetch the live status snapshot
    async fn fetch_status(&self) -> anyhow::Result<StatusSnapshot>;
}
