// HTTP request handlers
use crate::application::dashboard_service::{DashboardSummary, SetpointInput, View};
use crate::application::sample_store::VisibleRange;
use crate::infrastructure::http_response::png_response;
use crate::infrastructure::raster_surface::RasterSurface;
use crate::presentation::app_state::AppState;
use crate::presentation::frame_loop::frame_for_view;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

const MAX_IMAGE_SIDE: u32 = 4096;

#[derive(Deserialize)]
pub struct ChartQuery {
    /// Seconds back from the newest sample, or `all`.
    pub range: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Deserialize)]
pub struct SetpointInputRequest {
    pub focused: bool,
    pub value: Option<f64>,
}

/// Missing range uses the configured default; 0 means everything.
pub fn parse_range(raw: Option<&str>, default_secs: i64) -> Option<VisibleRange> {
    let secs = match raw.map(str::trim) {
        None | Some("") => default_secs,
        Some(s) if s.eq_ignore_ascii_case("all") => return Some(VisibleRange::All),
        Some(s) => s.parse::<i64>().ok().filter(|secs| *secs >= 0)?,
    };
    Some(if secs == 0 {
        VisibleRange::All
    } else {
        VisibleRange::Seconds(secs)
    })
}

fn image_side(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, MAX_IMAGE_SIDE)
}

fn encode(surface: &RasterSurface) -> Response {
    let png = match surface.encode_png() {
        Ok(png) => png,
        Err(e) => {
            tracing::error!("PNG encode failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    match png_response(png) {
        Ok(response) => response.into_response(),
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<DashboardSummary> {
    let dashboard = state.dashboard.lock().await;
    Json(dashboard.summary(Instant::now()))
}

/// Render the temperature chart for the requested window
pub async fn chart_png(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(range) = parse_range(query.range.as_deref(), state.render.default_range_secs) else {
        return (StatusCode::BAD_REQUEST, "range must be seconds or 'all'").into_response();
    };
    let mut surface = RasterSurface::new(
        image_side(query.width, state.render.chart_width),
        image_side(query.height, state.render.chart_height),
    );

    {
        let dashboard = state.dashboard.lock().await;
        let outcome = dashboard.render_chart(&mut surface, range);
        tracing::debug!("Chart rendered: {:?}", outcome);
    }

    encode(&surface)
}

/// The visible view: the latest animation frame, or the chart.
pub async fn view_png(State(state): State<Arc<AppState>>) -> Response {
    let latest = state.latest_frame.borrow().clone();
    let dashboard = state.dashboard.lock().await;
    let view = dashboard.view();

    if view == View::Chart {
        let mut surface = RasterSurface::new(state.render.chart_width, state.render.chart_height);
        let range =
            parse_range(None, state.render.default_range_secs).unwrap_or(VisibleRange::All);
        dashboard.render_chart(&mut surface, range);
        drop(dashboard);
        return encode(&surface);
    }

    if let Some(png) = frame_for_view(latest, view) {
        drop(dashboard);
        return match png_response(png) {
            Ok(response) => response.into_response(),
            Err(status) => status.into_response(),
        };
    }

    // No frame drawn for this view yet.
    let mut surface = RasterSurface::new(state.render.view_width, state.render.view_height);
    dashboard.render_view(&mut surface);
    drop(dashboard);
    encode(&surface)
}

pub async fn set_view(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, StatusCode> {
    let view = View::parse(&name).ok_or(StatusCode::NOT_FOUND)?;
    let mut dashboard = state.dashboard.lock().await;
    let now = Instant::now();
    dashboard.set_view(view, now);
    Ok(Json(dashboard.summary(now)))
}

/// Mirror the setpoint field's focus so polls leave an edit in progress alone
pub async fn setpoint_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetpointInputRequest>,
) -> Json<SetpointInput> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.set_setpoint_focus(request.focused, request.value);
    Json(dashboard.setpoint_input().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range(None, 3600), Some(VisibleRange::Seconds(3600)));
        assert_eq!(parse_range(None, 0), Some(VisibleRange::All));
        assert_eq!(parse_range(Some("all"), 3600), Some(VisibleRange::All));
        assert_eq!(parse_range(Some("ALL"), 3600), Some(VisibleRange::All));
        assert_eq!(parse_range(Some("300"), 3600), Some(VisibleRange::Seconds(300)));
        assert_eq!(parse_range(Some(""), 600), Some(VisibleRange::Seconds(600)));
        assert_eq!(parse_range(Some("-5"), 3600), None);
        assert_eq!(parse_range(Some("1h"), 3600), None);
    }

    #[test]
    fn test_image_side_is_clamped() {
        assert_eq!(image_side(None, 800), 800);
        assert_eq!(image_side(Some(0), 800), 1);
        assert_eq!(image_side(Some(100_000), 800), MAX_IMAGE_SIDE);
    }
}
