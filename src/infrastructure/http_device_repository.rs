// HTTP repository implementation - talks to the controller's JSON API
use crate::application::device_repository::DeviceRepository;
use crate::domain::controller_state::ControllerState;
use crate::domain::device::{History, StatusSnapshot};
use crate::domain::telemetry::{Sample, StateEvent};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Temperatures in the history payload are tenths of a degree.
const FIXED_POINT_SCALE: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned HTTP {status}")]
    Status {
        path: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Compact history as sent by the controller.
#[derive(Debug, Deserialize)]
struct HistoryPayload {
    now: i64,
    #[serde(default)]
    samples: Vec<(i64, i64, i64, i64)>,
    #[serde(default)]
    events: Vec<(i64, i64)>,
}

impl HistoryPayload {
    fn into_history(self) -> History {
        let samples = self
            .samples
            .into_iter()
            .map(|(t, current, target, state)| {
                Sample::new(
                    t,
                    current as f64 / FIXED_POINT_SCALE,
                    target as f64 / FIXED_POINT_SCALE,
                    ControllerState::from_index(state),
                )
            })
            .collect();
        let events = self
            .events
            .into_iter()
            .map(|(t, state)| StateEvent::new(t, ControllerState::from_index(state)))
            .collect();

        History {
            device_now: self.now,
            samples,
            events,
        }
    }
}

pub fn decode_history(body: &[u8]) -> Result<History, serde_json::Error> {
    serde_json::from_slice::<HistoryPayload>(body).map(HistoryPayload::into_history)
}

pub fn decode_status(body: &[u8]) -> Result<StatusSnapshot, serde_json::Error> {
    serde_json::from_slice(body)
}

#[derive(Debug, Clone)]
pub struct HttpDeviceRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDeviceRepository {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_bytes(&self, path: &'static str) -> Result<bytes::Bytes, DeviceError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| DeviceError::Transport { path, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status { path, status });
        }

        response
            .bytes()
            .await
            .map_err(|source| DeviceError::Transport { path, source })
    }
}

#[async_trait]
impl DeviceRepository for HttpDeviceRepository {
    async fn fetch_history(&self) -> anyhow::Result<History> {
        const PATH: &str = "/api/history";
        let body = self.get_bytes(PATH).await?;
        let history =
            decode_history(&body).map_err(|source| DeviceError::Decode { path: PATH, source })?;
        tracing::debug!(
            "Fetched history: {} samples, {} events ({} bytes)",
            history.samples.len(),
            history.events.len(),
            body.len()
        );
        Ok(history)
    }

    async fn fetch_status(&self) -> anyhow::Result<StatusSnapshot> {
        const PATH: &str = "/api/status";
        let body = self.get_bytes(PATH).await?;
        let status =
            decode_status(&body).map_err(|source| DeviceError::Decode { path: PATH, source })?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_history_scales_fixed_point() {
        let body = br#"{"now":10,"samples":[[0,200,225,0],[10,210,225,1]],"events":[[10,1]]}"#;
        let history = decode_history(body).unwrap();

        assert_eq!(history.device_now, 10);
        assert_eq!(history.samples.len(), 2);
        assert_eq!(history.samples[0].current, 20.0);
        assert_eq!(history.samples[0].target, 22.5);
        assert_eq!(history.samples[0].state, ControllerState::Idle);
        assert_eq!(history.samples[1].current, 21.0);
        assert_eq!(history.samples[1].state, ControllerState::Startup);
        assert_eq!(
            history.events,
            vec![StateEvent::new(10, ControllerState::Startup)]
        );
    }

    #[test]
    fn test_decode_history_keeps_sensor_fault_values() {
        let body = br#"{"now":5,"samples":[[5,15000,2250,3]]}"#;
        let history = decode_history(body).unwrap();
        assert_eq!(history.samples[0].current, 1500.0);
        assert!(!history.samples[0].has_valid_reading());
        assert!(history.events.is_empty());
    }

    #[test]
    fn test_decode_history_rejects_malformed_rows() {
        assert!(decode_history(br#"{"now":5,"samples":[[5,150]]}"#).is_err());
        assert!(decode_history(br#"{"samples":[]}"#).is_err());
    }

    #[test]
    fn test_decode_status_with_pid_block() {
        let body = br#"{
            "temp": 224.5, "setpoint": 225, "state": "Running",
            "auger": true, "fan": true, "igniter": false,
            "runtime": 360000, "errors": 0, "version": "1.4.0",
            "pid": {"p": 0.2, "i": 0.1, "d": -0.05, "output": 0.25, "error": 0.5,
                    "cycleTime": 20000, "cycleElapsed": 5000,
                    "lidOpen": false, "reigniteAttempts": 0}
        }"#;
        let status = decode_status(body).unwrap();
        assert_eq!(status.controller_state(), ControllerState::Running);
        let pid = status.pid.unwrap();
        assert_eq!(pid.cycle_time, 20000);
        assert_eq!(pid.cycle_progress(), 0.25);
    }

    #[test]
    fn test_decode_status_without_pid_block() {
        let status = decode_status(br#"{"temp": 70.0, "setpoint": 225.0, "state": "Idle"}"#).unwrap();
        assert!(status.pid.is_none());
        assert_eq!(status.controller_state(), ControllerState::Idle);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let repo =
            HttpDeviceRepository::new("http://smoker.local/".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(repo.base_url, "http://smoker.local");
    }
}
