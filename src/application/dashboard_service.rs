// Dashboard service - owns the telemetry buffers and drives the renderers
use crate::application::chart_renderer::{render_chart, ChartOutcome};
use crate::application::live_state::{LiveScalars, LiveState};
use crate::application::particles::{ParticleClass, ParticlePool};
use crate::application::render_scheduler::{FrameRequestId, FrameRequester, RenderScheduler};
use crate::application::sample_store::{AppendOutcome, SampleStore, VisibleRange};
use crate::application::scene_renderer::{
    render_pid_diagram, render_smoker_scene, SceneOutcome, SceneState, EMITTERS,
};
use crate::application::surface::DrawSurface;
use crate::domain::clock::ClockReconciler;
use crate::domain::device::{History, StatusSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

pub type SharedDashboard<R> = Arc<Mutex<Dashboard<R>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Chart,
    Smoker,
    Pid,
}

impl View {
    pub fn is_animated(self) -> bool {
        matches!(self, View::Smoker | View::Pid)
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chart" | "graph" => Some(View::Chart),
            "smoker" | "grill" => Some(View::Smoker),
            "pid" => Some(View::Pid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub retention_secs: i64,
    pub target_fps: u32,
    pub fire_capacity: usize,
    pub smoke_capacity: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionStatus {
    pub api_ok: bool,
    pub last_ok_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub firmware_version: Option<String>,
}

/// Local mirror of the setpoint input field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetpointInput {
    pub value: Option<f64>,
    pub focused: bool,
}

impl SetpointInput {
    /// A focused field belongs to the user and is never overwritten by a poll.
    pub fn sync(&mut self, device_setpoint: f64) {
        if !self.focused {
            self.value = Some(device_setpoint.round());
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub view: View,
    pub animating: bool,
    pub history_loaded: bool,
    pub samples: usize,
    pub events: usize,
    pub estimated_device_time: Option<f64>,
    pub connection: ConnectionStatus,
    pub setpoint_input: SetpointInput,
    pub live: Option<LiveScalars>,
    pub fire_particles: usize,
    pub smoke_particles: usize,
}

pub struct Dashboard<R: FrameRequester> {
    store: SampleStore,
    clock: ClockReconciler,
    live: LiveState,
    particles: ParticlePool,
    scene: SceneState,
    scheduler: RenderScheduler<R>,
    view: View,
    connection: ConnectionStatus,
    setpoint_input: SetpointInput,
}

impl<R: FrameRequester> Dashboard<R> {
    pub fn new(settings: &DashboardSettings, requester: R) -> Self {
        Self::with_particles(
            settings,
            requester,
            ParticlePool::new(settings.fire_capacity, settings.smoke_capacity),
        )
    }

    pub fn with_particles(settings: &DashboardSettings, requester: R, particles: ParticlePool) -> Self {
        Self {
            store: SampleStore::new(settings.retention_secs),
            clock: ClockReconciler::new(),
            live: LiveState::new(),
            particles,
            scene: SceneState::default(),
            scheduler: RenderScheduler::new(requester, settings.target_fps),
            view: View::Chart,
            connection: ConnectionStatus::default(),
            setpoint_input: SetpointInput::default(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    #[cfg(test)]
    pub fn live(&self) -> &LiveState {
        &self.live
    }

    #[cfg(test)]
    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    #[cfg(test)]
    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &RenderScheduler<R> {
        &self.scheduler
    }

    pub fn view(&self) -> View {
        self.view
    }

    #[cfg(test)]
    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn setpoint_input(&self) -> &SetpointInput {
        &self.setpoint_input
    }

    pub fn is_history_loaded(&self) -> bool {
        self.store.is_seeded() && self.clock.is_initialized()
    }

    /// Replace the buffers with a freshly fetched history and rebase the clock.
    pub fn apply_history(&mut self, history: History, local_now: Instant) {
        self.clock.rebase(history.device_now, local_now);
        self.store
            .seed(history.samples, history.events, history.device_now);
        tracing::info!(
            "History loaded: {} samples, {} events, device uptime {}s",
            self.store.samples().len(),
            self.store.events().len(),
            history.device_now
        );
    }

    pub fn apply_status(&mut self, status: &StatusSnapshot, local_now: Instant) -> AppendOutcome {
        self.connection.api_ok = true;
        self.connection.consecutive_failures = 0;
        self.connection.last_ok_at = Some(Utc::now());
        if status.version.is_some() {
            self.connection.firmware_version = status.version.clone();
        }
        self.setpoint_input.sync(status.setpoint);

        if self.view.is_animated() {
            self.live.update(status);
        }

        let Some(device_time) = self.clock.project_secs(local_now) else {
            tracing::debug!("Status received before history, not charted");
            return AppendOutcome::Rejected;
        };
        let outcome = self.store.append(
            device_time,
            status.temp,
            status.setpoint,
            status.controller_state(),
        );
        if let AppendOutcome::Appended { state_changed: true } = outcome {
            tracing::info!("Controller state changed to {}", status.controller_state().name());
        }
        outcome
    }

    /// A poll failed in transport or decoding. Chart data is kept.
    pub fn mark_poll_failed(&mut self, error: &dyn fmt::Display) {
        self.connection.api_ok = false;
        self.connection.consecutive_failures += 1;
        tracing::warn!(
            "Status poll failed ({} in a row): {}",
            self.connection.consecutive_failures,
            error
        );
    }

    pub fn set_view(&mut self, view: View, now: Instant) {
        if view == self.view {
            return;
        }
        tracing::info!("Switching view {:?} -> {:?}", self.view, view);
        self.scheduler.stop();
        self.view = view;
        if view.is_animated() {
            self.scheduler.start(now);
        }
    }

    pub fn set_setpoint_focus(&mut self, focused: bool, value: Option<f64>) {
        self.setpoint_input.focused = focused;
        if value.is_some() {
            self.setpoint_input.value = value;
        }
    }

    /// Handle a frame callback, drawing the animated view when it is due.
    pub fn on_frame(
        &mut self,
        id: FrameRequestId,
        now: Instant,
        surface: &mut dyn DrawSurface,
    ) -> Option<SceneOutcome> {
        let elapsed = self.scheduler.on_frame(id, now)?;
        self.animate(elapsed.as_secs_f32());
        self.render_view(surface)
    }

    fn animate(&mut self, dt: f32) {
        if let Some(live) = self.live.scalars() {
            self.scene.advance(dt, live);
            self.particles.emit(dt, live.output(), live.temp, EMITTERS);
        }
        self.particles.advance(dt);
    }

    pub fn render_chart(&self, surface: &mut dyn DrawSurface, range: VisibleRange) -> ChartOutcome {
        render_chart(surface, self.store.visible_slice(range))
    }

    /// Draw the current animated view. `None` while the chart is showing.
    pub fn render_view(&self, surface: &mut dyn DrawSurface) -> Option<SceneOutcome> {
        let scalars = self.live.scalars();
        match self.view {
            View::Chart => None,
            View::Smoker => Some(render_smoker_scene(
                surface,
                scalars,
                &self.scene,
                &self.particles,
            )),
            View::Pid => Some(render_pid_diagram(surface, scalars, self.live.pid_history())),
        }
    }

    pub fn summary(&self, local_now: Instant) -> DashboardSummary {
        DashboardSummary {
            view: self.view,
            animating: self.scheduler.is_running(),
            history_loaded: self.is_history_loaded(),
            samples: self.store.samples().len(),
            events: self.store.events().len(),
            estimated_device_time: self.clock.project(local_now),
            connection: self.connection.clone(),
            setpoint_input: self.setpoint_input.clone(),
            live: self.live.scalars().cloned(),
            fire_particles: self.particles.active_count(ParticleClass::Fire),
            smoke_particles: self.particles.active_count(ParticleClass::Smoke),
        }
    }
}
