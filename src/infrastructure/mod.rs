// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod frame_ticker;
pub mod http_device_repository;
pub mod http_response;
pub mod raster_surface;
