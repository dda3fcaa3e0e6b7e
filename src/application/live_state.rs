// Live scalar state - latest controller telemetry plus the rolling PID buffer
use crate::domain::controller_state::ControllerState;
use crate::domain::device::{PidTelemetry, StatusSnapshot};
use crate::domain::telemetry::PidSample;
use serde::Serialize;
use std::collections::VecDeque;

pub const PID_HISTORY_CAPACITY: usize = 90;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiveScalars {
    pub temp: f64,
    pub setpoint: f64,
    pub state: ControllerState,
    pub auger: bool,
    pub fan: bool,
    pub igniter: bool,
    pub errors: u32,
    /// Milliseconds into the current cook.
    pub runtime_ms: u64,
    pub pid: Option<PidTelemetry>,
}

impl LiveScalars {
    pub fn from_status(status: &StatusSnapshot) -> Self {
        Self {
            temp: status.temp,
            setpoint: status.setpoint,
            state: status.controller_state(),
            auger: status.auger,
            fan: status.fan,
            igniter: status.igniter,
            errors: status.errors,
            runtime_ms: status.runtime,
            pid: status.pid.clone(),
        }
    }

    pub fn lid_open(&self) -> bool {
        self.pid.as_ref().is_some_and(|p| p.lid_open)
    }

    pub fn reignite_attempts(&self) -> u32 {
        self.pid.as_ref().map_or(0, |p| p.reignite_attempts)
    }

    /// Cook time as `m:ss`, minutes are not wrapped into hours.
    pub fn runtime_label(&self) -> String {
        let secs = self.runtime_ms / 1000;
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    /// Combined controller output, 0 when no PID block was reported.
    pub fn output(&self) -> f64 {
        self.pid.as_ref().map_or(0.0, |p| p.output)
    }
}

#[derive(Debug, Clone)]
pub struct PidHistory {
    samples: VecDeque<PidSample>,
    capacity: usize,
}

impl PidHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, sample: PidSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PidSample> {
        self.samples.iter()
    }

    /// Largest absolute term or output, for symmetric sparkline scaling.
    pub fn magnitude(&self) -> f64 {
        self.samples
            .iter()
            .flat_map(|s| [s.proportional, s.integral, s.derivative, s.output])
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |m, v| m.max(v.abs()))
    }
}

impl Default for PidHistory {
    fn default() -> Self {
        Self::new(PID_HISTORY_CAPACITY)
    }
}

/// Telemetry that drives the animated views.
#[derive(Debug, Clone, Default)]
pub struct LiveState {
    scalars: Option<LiveScalars>,
    pid_history: PidHistory,
}

impl LiveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite wholesale with the latest status.
    pub fn update(&mut self, status: &StatusSnapshot) {
        let scalars = LiveScalars::from_status(status);
        if let Some(pid) = &scalars.pid {
            self.pid_history.push(pid.sample());
        }
        self.scalars = Some(scalars);
    }

    pub fn scalars(&self) -> Option<&LiveScalars> {
        self.scalars.as_ref()
    }

    pub fn pid_history(&self) -> &PidHistory {
        &self.pid_history
    }
}
