// Application layer - telemetry buffers, renderers and services
pub mod axis;
pub mod chart_renderer;
pub mod dashboard_service;
pub mod device_repository;
pub mod live_state;
pub mod particles;
pub mod polling_service;
pub mod render_scheduler;
pub mod sample_store;
pub mod scene_renderer;
pub mod surface;
