// Frame loop - turns frame ticks into rendered animation frames
use crate::application::dashboard_service::{SharedDashboard, View};
use crate::application::scene_renderer::SceneOutcome;
use crate::infrastructure::frame_ticker::{FrameTick, TokioFrameRequester};
use crate::infrastructure::raster_surface::RasterSurface;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// An encoded animation frame and the view it was drawn for.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub view: View,
    pub png: Bytes,
}

/// The published frame, if it belongs to the view now showing.
pub fn frame_for_view(latest: Option<RenderedFrame>, view: View) -> Option<Bytes> {
    latest.filter(|frame| frame.view == view).map(|frame| frame.png)
}

pub async fn run_frame_loop(
    dashboard: SharedDashboard<TokioFrameRequester>,
    ticks: mpsc::UnboundedReceiver<FrameTick>,
    frames: watch::Sender<Option<RenderedFrame>>,
    mut surface: RasterSurface,
) {
    let mut ticks = UnboundedReceiverStream::new(ticks);
    let mut drawn: u64 = 0;

    while let Some(tick) = ticks.next().await {
        let (view, outcome) = {
            let mut dashboard = dashboard.lock().await;
            let outcome = dashboard.on_frame(tick.id, tick.at, &mut surface);
            (dashboard.view(), outcome)
        };

        match outcome {
            None | Some(SceneOutcome::Skipped) => continue,
            Some(SceneOutcome::Drawn { banners }) if !banners.is_empty() => {
                tracing::trace!("Frame {} banners: {:?}", drawn, banners);
            }
            Some(_) => {}
        }

        match surface.encode_png() {
            Ok(png) => {
                frames.send_replace(Some(RenderedFrame { view, png }));
                drawn += 1;
            }
            Err(e) => tracing::warn!("Failed to encode frame: {}", e),
        }
    }

    tracing::debug!("Frame loop finished after {} frames", drawn);
}
