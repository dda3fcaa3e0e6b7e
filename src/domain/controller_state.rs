// Controller state enumeration reported by the smoker
use super::color::Color;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ControllerState {
    #[default]
    Idle,
    Startup,
    Running,
    Cooldown,
    Shutdown,
    Error,
    Reignite,
}

impl ControllerState {
    pub const ALL: [ControllerState; 7] = [
        ControllerState::Idle,
        ControllerState::Startup,
        ControllerState::Running,
        ControllerState::Cooldown,
        ControllerState::Shutdown,
        ControllerState::Error,
        ControllerState::Reignite,
    ];

    /// Unknown indices map to `Idle`.
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Case-insensitive lookup by display name. Unknown names map to `Idle`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ControllerState::Idle => "Idle",
            ControllerState::Startup => "Startup",
            ControllerState::Running => "Running",
            ControllerState::Cooldown => "Cooldown",
            ControllerState::Shutdown => "Shutdown",
            ControllerState::Error => "Error",
            ControllerState::Reignite => "Reignite",
        }
    }

    pub fn color(self) -> Color {
        let hex = match self {
            ControllerState::Idle => "#555555",
            ControllerState::Startup => "#ff6b35",
            ControllerState::Running => "#2ecc71",
            ControllerState::Cooldown => "#3498db",
            ControllerState::Shutdown => "#f1c40f",
            ControllerState::Error => "#e74c3c",
            ControllerState::Reignite => "#e67e22",
        };
        Color::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_round_trips_known_states() {
        for state in ControllerState::ALL {
            assert_eq!(ControllerState::from_index(state.index() as i64), state);
        }
    }

    #[test]
    fn test_unknown_index_falls_back_to_idle() {
        assert_eq!(ControllerState::from_index(7), ControllerState::Idle);
        assert_eq!(ControllerState::from_index(-1), ControllerState::Idle);
        assert_eq!(ControllerState::from_index(i64::MAX), ControllerState::Idle);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ControllerState::from_name("Running"), ControllerState::Running);
        assert_eq!(ControllerState::from_name("reignite"), ControllerState::Reignite);
        assert_eq!(ControllerState::from_name("Preheat"), ControllerState::Idle);
        assert_eq!(ControllerState::from_name(""), ControllerState::Idle);
    }
}
