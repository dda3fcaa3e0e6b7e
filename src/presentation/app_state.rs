// Application state for HTTP handlers
use crate::application::dashboard_service::SharedDashboard;
use crate::infrastructure::config::RenderConfig;
use crate::infrastructure::frame_ticker::TokioFrameRequester;
use crate::presentation::frame_loop::RenderedFrame;
use tokio::sync::watch;

pub struct AppState {
    pub dashboard: SharedDashboard<TokioFrameRequester>,
    /// Last animated frame, PNG-encoded by the frame loop.
    pub latest_frame: watch::Receiver<Option<RenderedFrame>>,
    pub render: RenderConfig,
}
