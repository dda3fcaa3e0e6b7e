// Payloads reported by the smoker controller
use super::controller_state::ControllerState;
use super::telemetry::{PidSample, Sample, StateEvent};
use serde::{Deserialize, Serialize};

/// Bootstrap history, already decoded from the compact wire form.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Device uptime in seconds when the history was produced.
    pub device_now: i64,
    pub samples: Vec<Sample>,
    pub events: Vec<StateEvent>,
}

/// One `/api/status` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub temp: f64,
    pub setpoint: f64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub state_index: Option<i64>,
    #[serde(default)]
    pub auger: bool,
    #[serde(default)]
    pub fan: bool,
    #[serde(default)]
    pub igniter: bool,
    /// Milliseconds in the current cook.
    #[serde(default)]
    pub runtime: u64,
    #[serde(default)]
    pub errors: u32,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub pid: Option<PidTelemetry>,
}

impl StatusSnapshot {
    /// The numeric index wins when present; otherwise the name is matched.
    pub fn controller_state(&self) -> ControllerState {
        match self.state_index {
            Some(index) => ControllerState::from_index(index),
            None => ControllerState::from_name(&self.state),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PidTelemetry {
    #[serde(default)]
    pub p: f64,
    #[serde(default)]
    pub i: f64,
    #[serde(default)]
    pub d: f64,
    /// Combined output, 0.0..=1.0 auger duty.
    #[serde(default)]
    pub output: f64,
    #[serde(default)]
    pub error: f64,
    /// Auger cycle length in milliseconds.
    #[serde(default)]
    pub cycle_time: u32,
    #[serde(default)]
    pub cycle_elapsed: u32,
    #[serde(default)]
    pub lid_open: bool,
    #[serde(default)]
    pub reignite_attempts: u32,
}

impl PidTelemetry {
    pub fn sample(&self) -> PidSample {
        PidSample {
            proportional: self.p,
            integral: self.i,
            derivative: self.d,
            output: self.output,
        }
    }

    /// Fraction of the auger cycle elapsed, 0.0 when no cycle is configured.
    pub fn cycle_progress(&self) -> f64 {
        if self.cycle_time == 0 {
            return 0.0;
        }
        (self.cycle_elapsed as f64 / self.cycle_time as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_without_pid_block() {
        let json = r#"{"temp":221.5,"setpoint":225,"state":"Running","auger":true,
            "fan":true,"igniter":false,"runtime":61000,"errors":0}"#;
        let status: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(status.controller_state(), ControllerState::Running);
        assert!(status.pid.is_none());
        assert!(status.auger);
    }

    #[test]
    fn test_status_with_pid_block() {
        let json = r#"{"temp":200,"setpoint":225,"state":"Running",
            "pid":{"p":0.58,"i":0.1,"d":-0.02,"output":0.66,"error":-25,
                   "cycleTime":20000,"cycleElapsed":5000,"lidOpen":true,"reigniteAttempts":1}}"#;
        let status: StatusSnapshot = serde_json::from_str(json).unwrap();
        let pid = status.pid.unwrap();
        assert!(pid.lid_open);
        assert_eq!(pid.reignite_attempts, 1);
        assert!((pid.cycle_progress() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_state_index_overrides_name() {
        let json = r#"{"temp":200,"setpoint":225,"state":"Running","stateIndex":6}"#;
        let status: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(status.controller_state(), ControllerState::Reignite);
    }
}
