// Telemetry data domain models
use super::controller_state::ControllerState;
use serde::Serialize;

/// Readings outside this open interval are sensor faults, not temperatures.
pub const SENSOR_MIN_VALID: f64 = -100.0;
pub const SENSOR_MAX_VALID: f64 = 1000.0;

pub fn is_valid_reading(value: f64) -> bool {
    value > SENSOR_MIN_VALID && value < SENSOR_MAX_VALID
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Device-relative seconds.
    pub time: i64,
    pub current: f64,
    pub target: f64,
    pub state: ControllerState,
}

impl Sample {
    pub fn new(time: i64, current: f64, target: f64, state: ControllerState) -> Self {
        Self {
            time,
            current,
            target,
            state,
        }
    }

    pub fn has_valid_reading(&self) -> bool {
        is_valid_reading(self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateEvent {
    pub time: i64,
    pub state: ControllerState,
}

impl StateEvent {
    pub fn new(time: i64, state: ControllerState) -> Self {
        Self { time, state }
    }
}

/// One entry of the rolling PID buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidSample {
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
    pub output: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_validity() {
        assert!(is_valid_reading(225.0));
        assert!(is_valid_reading(-99.9));
        assert!(!is_valid_reading(1500.0));
        assert!(!is_valid_reading(-100.0));
        assert!(!is_valid_reading(1000.0));
        assert!(!is_valid_reading(f64::NAN));
    }
}
