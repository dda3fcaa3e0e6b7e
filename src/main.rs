// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{routing::{get, post}, Router};
use tokio::sync::{watch, Mutex};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::Dashboard;
use crate::application::polling_service::PollingService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::frame_ticker::TokioFrameRequester;
use crate::infrastructure::http_device_repository::HttpDeviceRepository;
use crate::infrastructure::raster_surface::RasterSurface;
use crate::presentation::app_state::AppState;
use crate::presentation::frame_loop::run_frame_loop;
use crate::presentation::handlers::{
    chart_png, get_state, health_check, set_view, setpoint_input, view_png,
};

/// Frame callbacks arrive at display rate; the scheduler throttles to target fps.
const DISPLAY_HZ: u32 = 60;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpDeviceRepository::new(
        config.device.base_url.clone(),
        config.request_timeout(),
    )?);

    // Create dashboard and services (application layer)
    let (requester, frame_ticks) = TokioFrameRequester::new(DISPLAY_HZ);
    let dashboard = Arc::new(Mutex::new(Dashboard::new(
        &config.dashboard_settings(),
        requester,
    )));
    let poller = PollingService::new(repository, dashboard.clone(), config.poll_settings());

    let (frame_tx, frame_rx) = watch::channel(None);
    tokio::spawn(run_frame_loop(
        dashboard.clone(),
        frame_ticks,
        frame_tx,
        RasterSurface::new(config.render.view_width, config.render.view_height),
    ));
    tokio::spawn(poller.run());

    // Create application state
    let addr = config.bind_addr()?;
    let state = Arc::new(AppState {
        dashboard,
        latest_frame: frame_rx,
        render: config.render.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/state", get(get_state))
        .route("/chart.png", get(chart_png))
        .route("/view.png", get(view_png))
        .route("/api/view/:name", post(set_view))
        .route("/api/setpoint-input", post(setpoint_input))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    tracing::info!(
        "Starting smoker-telemetry viewer on {} (controller {})",
        addr,
        config.device.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
