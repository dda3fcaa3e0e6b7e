// Configuration - optional config/dashboard.toml layered with SMOKER__* env vars
use crate::application::dashboard_service::DashboardSettings;
use crate::application::polling_service::PollSettings;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub device: DeviceConfig,
    pub polling: PollingConfig,
    pub buffer: BufferConfig,
    pub render: RenderConfig,
    pub particles: ParticlesConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Controller base URL, e.g. http://smoker.local
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    pub status_interval_ms: u64,
    /// 0 disables periodic history re-fetch.
    pub history_refresh_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BufferConfig {
    pub retention_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    pub target_fps: u32,
    pub chart_width: u32,
    pub chart_height: u32,
    pub view_width: u32,
    pub view_height: u32,
    /// Default visible range in seconds; 0 shows everything.
    pub default_range_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParticlesConfig {
    pub fire_capacity: usize,
    pub smoke_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl DashboardConfig {
    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            retention_secs: self.buffer.retention_secs,
            target_fps: self.render.target_fps,
            fire_capacity: self.particles.fire_capacity,
            smoke_capacity: self.particles.smoke_capacity,
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            status_interval: Duration::from_millis(self.polling.status_interval_ms.max(100)),
            history_refresh: match self.polling.history_refresh_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.device.request_timeout_ms)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid server.bind '{}': {}", self.server.bind, e))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.device.base_url.trim().is_empty() {
            anyhow::bail!("device.base_url must be set");
        }
        if self.buffer.retention_secs <= 0 {
            anyhow::bail!("buffer.retention_secs must be positive");
        }
        if self.render.target_fps == 0 {
            anyhow::bail!("render.target_fps must be positive");
        }
        Ok(())
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("device.base_url", "http://smoker.local")?
        .set_default("device.request_timeout_ms", 1500)?
        .set_default("polling.status_interval_ms", 2000)?
        .set_default("polling.history_refresh_secs", 0)?
        .set_default("buffer.retention_secs", 3660)?
        .set_default("render.target_fps", 30)?
        .set_default("render.chart_width", 800)?
        .set_default("render.chart_height", 360)?
        .set_default("render.view_width", 400)?
        .set_default("render.view_height", 300)?
        .set_default("render.default_range_secs", 3600)?
        .set_default("particles.fire_capacity", 96)?
        .set_default("particles.smoke_capacity", 64)?
        .set_default("server.bind", "127.0.0.1:8080")?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("SMOKER").separator("__"))
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
