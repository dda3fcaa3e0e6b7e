// Domain layer - Telemetry models with no I/O
pub mod clock;
pub mod color;
pub mod controller_state;
pub mod device;
pub mod telemetry;
