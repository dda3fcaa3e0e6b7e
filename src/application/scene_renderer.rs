// Smoker schematic and PID block diagram, redrawn every animation frame
use crate::application::live_state::{LiveScalars, PidHistory};
use crate::application::particles::{EmitterOrigin, ParticleClass, ParticlePool};
use crate::application::surface::{DrawSurface, Path, Point, Rect, Stroke, TextAlign, TextStyle};
use crate::domain::color::{palette, Color};
use crate::domain::controller_state::ControllerState;
use crate::domain::telemetry::{is_valid_reading, PidSample};
use std::f32::consts::{PI, TAU};

pub const REFERENCE_WIDTH: f32 = 400.0;
pub const REFERENCE_HEIGHT: f32 = 300.0;

const AUGER_RAD_PER_SEC: f32 = 2.2;
const FAN_RAD_PER_SEC: f32 = 14.0;
const GAUGE_MAX_TEMP: f64 = 500.0;
const GAUGE_START: f32 = 0.75 * PI;
const GAUGE_SWEEP: f32 = 1.5 * PI;

/// Particle emitters, in reference layout coordinates.
pub const EMITTERS: EmitterOrigin = EmitterOrigin {
    fire: (140.0, 204.0),
    smoke: (298.0, 48.0),
};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutcome {
    Skipped,
    /// The PID view had no controller block to show.
    NoTelemetry,
    Drawn { banners: Vec<String> },
}

/// Uniform fit of the reference layout into the surface, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl SceneTransform {
    pub fn fit(width: f32, height: f32) -> Self {
        let scale = (width / REFERENCE_WIDTH).min(height / REFERENCE_HEIGHT);
        Self {
            scale,
            offset_x: (width - REFERENCE_WIDTH * scale) / 2.0,
            offset_y: (height - REFERENCE_HEIGHT * scale) / 2.0,
        }
    }

    pub fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }

    pub fn rect(&self, x: f32, y: f32, w: f32, h: f32) -> Rect {
        let p = self.point(x, y);
        Rect::new(p.x, p.y, w * self.scale, h * self.scale)
    }

    pub fn len(&self, v: f32) -> f32 {
        v * self.scale
    }
}

/// Mechanical angles that persist across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneState {
    pub auger_angle: f32,
    pub fan_angle: f32,
}

impl SceneState {
    /// Rotate whatever is switched on. Stopped parts keep their angle.
    pub fn advance(&mut self, dt: f32, live: &LiveScalars) {
        if live.auger {
            self.auger_angle = (self.auger_angle + AUGER_RAD_PER_SEC * dt).rem_euclid(TAU);
        }
        if live.fan {
            self.fan_angle = (self.fan_angle + FAN_RAD_PER_SEC * dt).rem_euclid(TAU);
        }
    }
}

pub fn render_smoker_scene(
    surface: &mut dyn DrawSurface,
    live: Option<&LiveScalars>,
    scene: &SceneState,
    particles: &ParticlePool,
) -> SceneOutcome {
    if !surface.is_drawable() {
        return SceneOutcome::Skipped;
    }
    let (w, h) = surface.size();
    let tf = SceneTransform::fit(w, h);
    surface.clear(palette::BACKGROUND);

    draw_hopper_and_auger(surface, &tf, scene.auger_angle, live.is_some_and(|l| l.auger));
    draw_chamber(surface, &tf, live.is_some_and(|l| l.igniter));
    draw_fan(surface, &tf, scene.fan_angle, live.is_some_and(|l| l.fan));
    draw_particles(surface, &tf, particles);
    draw_gauge(surface, &tf, live);

    let Some(live) = live else {
        surface.fill_text(
            "Waiting for telemetry\u{2026}",
            tf.point(200.0, 22.0),
            &TextStyle::new(palette::PLACEHOLDER, tf.len(12.0), TextAlign::Center),
        );
        return SceneOutcome::Drawn { banners: Vec::new() };
    };

    surface.fill_text(
        live.state.name(),
        tf.point(12.0, 22.0),
        &TextStyle::new(live.state.color(), tf.len(13.0), TextAlign::Left).bold(),
    );
    let banners = draw_banners(surface, &tf, live);
    SceneOutcome::Drawn { banners }
}

fn draw_hopper_and_auger(surface: &mut dyn DrawSurface, tf: &SceneTransform, angle: f32, running: bool) {
    surface.fill_rect(tf.rect(20.0, 60.0, 70.0, 90.0), palette::STEEL);
    surface.fill_text(
        "HOPPER",
        tf.point(55.0, 110.0),
        &TextStyle::new(palette::AXIS_LABEL, tf.len(9.0), TextAlign::Center),
    );

    surface.fill_rect(tf.rect(40.0, 150.0, 90.0, 20.0), palette::STEEL_LIGHT);
    let pitch = 14.0;
    let shift = angle / TAU * pitch;
    let flight = Stroke::solid(
        if running { palette::TEXT } else { palette::AXIS_LABEL },
        tf.len(2.0),
    );
    for k in -1..7 {
        let x = 42.0 + k as f32 * pitch + shift;
        if !(40.0..=122.0).contains(&x) {
            continue;
        }
        surface.stroke_line(tf.point(x, 152.0), tf.point(x + 7.0, 168.0), &flight);
    }
}

fn draw_chamber(surface: &mut dyn DrawSurface, tf: &SceneTransform, igniter_on: bool) {
    surface.fill_rect(tf.rect(110.0, 100.0, 180.0, 100.0), palette::STEEL);
    surface.stroke_line(
        tf.point(110.0, 140.0),
        tf.point(290.0, 140.0),
        &Stroke::dashed(palette::STEEL_LIGHT, tf.len(2.0), tf.len(6.0), tf.len(3.0)),
    );
    // Chimney
    surface.fill_rect(tf.rect(290.0, 48.0, 16.0, 62.0), palette::STEEL_LIGHT);
    // Firepot
    surface.fill_rect(tf.rect(122.0, 200.0, 36.0, 18.0), palette::STEEL_LIGHT);

    let igniter = if igniter_on {
        palette::HOT
    } else {
        palette::STEEL
    };
    surface.fill_rect(tf.rect(158.0, 206.0, 12.0, 6.0), igniter);
    if igniter_on {
        surface.fill_circle(tf.point(164.0, 209.0), tf.len(9.0), palette::HOT.with_alpha(0.25));
    }
}

fn draw_fan(surface: &mut dyn DrawSurface, tf: &SceneTransform, angle: f32, running: bool) {
    let center = (75.0, 240.0);
    surface.fill_circle(tf.point(center.0, center.1), tf.len(20.0), palette::STEEL);
    let blade = Stroke::solid(
        if running { palette::COLD } else { palette::AXIS_LABEL },
        tf.len(3.0),
    );
    for k in 0..4 {
        let a = angle + k as f32 * PI / 2.0;
        let tip = (center.0 + 16.0 * a.cos(), center.1 + 16.0 * a.sin());
        surface.stroke_line(tf.point(center.0, center.1), tf.point(tip.0, tip.1), &blade);
    }
    surface.stroke_line(
        tf.point(95.0, 240.0),
        tf.point(122.0, 212.0),
        &Stroke::solid(palette::STEEL_LIGHT, tf.len(4.0)),
    );
}

fn draw_particles(surface: &mut dyn DrawSurface, tf: &SceneTransform, particles: &ParticlePool) {
    let fire = particles.fire_color();
    for p in particles.active() {
        let color = match p.class {
            ParticleClass::Fire => fire.with_alpha(p.opacity),
            ParticleClass::Smoke => palette::SMOKE.with_alpha(p.opacity),
        };
        surface.fill_circle(tf.point(p.x, p.y), tf.len(p.size), color);
    }
}

fn gauge_angle(temp: f64) -> f32 {
    let frac = (temp / GAUGE_MAX_TEMP).clamp(0.0, 1.0) as f32;
    GAUGE_START + frac * GAUGE_SWEEP
}

fn gauge_color(temp: f64) -> Color {
    if !is_valid_reading(temp) || temp < 0.0 {
        palette::PLACEHOLDER
    } else if temp < 150.0 {
        palette::COLD
    } else if temp > 400.0 {
        palette::HOT
    } else {
        palette::TEMPERATURE
    }
}

fn draw_gauge(surface: &mut dyn DrawSurface, tf: &SceneTransform, live: Option<&LiveScalars>) {
    let (cx, cy, r) = (350.0, 180.0, 36.0);
    let arc_point = |a: f32, radius: f32| tf.point(cx + radius * a.cos(), cy + radius * a.sin());

    let mut track = Path::new();
    let steps = 36;
    for i in 0..=steps {
        let a = GAUGE_START + GAUGE_SWEEP * i as f32 / steps as f32;
        if i == 0 {
            track.move_to(arc_point(a, r));
        } else {
            track.line_to(arc_point(a, r));
        }
    }
    surface.stroke_path(&track, &Stroke::solid(palette::STEEL_LIGHT, tf.len(5.0)));

    let Some(live) = live else {
        draw_readout(surface, tf, "--", None);
        return;
    };

    let valid = is_valid_reading(live.temp);
    if valid {
        let end = gauge_angle(live.temp);
        let mut fill = Path::new();
        fill.move_to(arc_point(GAUGE_START, r));
        let filled_steps = ((end - GAUGE_START) / GAUGE_SWEEP * steps as f32).ceil() as usize;
        for i in 1..=filled_steps.max(1) {
            let a = (GAUGE_START + GAUGE_SWEEP * i as f32 / steps as f32).min(end);
            fill.line_to(arc_point(a, r));
        }
        surface.stroke_path(&fill, &Stroke::solid(gauge_color(live.temp), tf.len(5.0)));
        surface.stroke_line(
            tf.point(cx, cy),
            arc_point(end, r - 8.0),
            &Stroke::solid(palette::TEXT, tf.len(1.5)),
        );
    }

    surface.fill_circle(
        arc_point(gauge_angle(live.setpoint), r),
        tf.len(3.5),
        palette::SETPOINT,
    );

    let reading = if valid {
        format!("{:.0}\u{00B0}", live.temp)
    } else {
        "--".to_string()
    };
    draw_readout(surface, tf, &reading, Some(live.setpoint));
    surface.fill_text(
        &live.runtime_label(),
        tf.point(350.0, 250.0),
        &TextStyle::new(palette::AXIS_LABEL, tf.len(10.0), TextAlign::Center),
    );
}

fn draw_readout(surface: &mut dyn DrawSurface, tf: &SceneTransform, reading: &str, setpoint: Option<f64>) {
    surface.fill_text(
        reading,
        tf.point(350.0, 186.0),
        &TextStyle::new(palette::TEXT, tf.len(16.0), TextAlign::Center).bold(),
    );
    if let Some(sp) = setpoint {
        surface.fill_text(
            &format!("SET {:.0}\u{00B0}", sp),
            tf.point(350.0, 232.0),
            &TextStyle::new(palette::SETPOINT, tf.len(10.0), TextAlign::Center),
        );
    }
}

fn draw_banners(surface: &mut dyn DrawSurface, tf: &SceneTransform, live: &LiveScalars) -> Vec<String> {
    let mut banners = Vec::new();
    if live.lid_open() {
        banners.push(("LID OPEN".to_string(), palette::WARNING));
    }
    let attempts = live.reignite_attempts();
    if live.state == ControllerState::Reignite || attempts > 0 {
        banners.push((format!("REIGNITE ATTEMPT {}", attempts.max(1)), palette::TEMPERATURE));
    }
    if live.state == ControllerState::Error {
        banners.push((format!("ERROR ({} faults)", live.errors), palette::HOT));
    }

    for (i, (text, color)) in banners.iter().enumerate() {
        let y = 30.0 + i as f32 * 22.0;
        surface.fill_rect(tf.rect(130.0, y, 140.0, 18.0), color.with_alpha(0.2));
        surface.fill_text(
            text,
            tf.point(200.0, y + 13.0),
            &TextStyle::new(*color, tf.len(11.0), TextAlign::Center).bold(),
        );
    }
    banners.into_iter().map(|(text, _)| text).collect()
}

const TERM_COLORS: [Color; 4] = [
    Color::rgb(0xff, 0x6b, 0x35),
    Color::rgb(0x2e, 0xcc, 0x71),
    Color::rgb(0x34, 0x98, 0xdb),
    Color::rgb(0xf1, 0xc4, 0x0f),
];

pub fn render_pid_diagram(
    surface: &mut dyn DrawSurface,
    live: Option<&LiveScalars>,
    history: &PidHistory,
) -> SceneOutcome {
    if !surface.is_drawable() {
        return SceneOutcome::Skipped;
    }
    let (w, h) = surface.size();
    let tf = SceneTransform::fit(w, h);
    surface.clear(palette::BACKGROUND);

    let Some((live, pid)) = live.and_then(|l| l.pid.as_ref().map(|p| (l, p))) else {
        surface.fill_text(
            "No controller telemetry",
            tf.point(200.0, 150.0),
            &TextStyle::new(palette::PLACEHOLDER, tf.len(13.0), TextAlign::Center),
        );
        return SceneOutcome::NoTelemetry;
    };

    let wire = Stroke::solid(palette::STEEL_LIGHT, tf.len(1.5));
    let label = |size: f32, color: Color| TextStyle::new(color, tf.len(size), TextAlign::Center);

    // Setpoint and feedback summing junction
    surface.fill_rect(tf.rect(10.0, 45.0, 60.0, 26.0), palette::STEEL);
    surface.fill_text(&format!("SP {:.0}", live.setpoint), tf.point(40.0, 62.0), &label(10.0, palette::SETPOINT));
    surface.stroke_line(tf.point(70.0, 58.0), tf.point(96.0, 58.0), &wire);
    surface.fill_circle(tf.point(106.0, 58.0), tf.len(10.0), palette::STEEL);
    surface.fill_text("+", tf.point(106.0, 62.0), &label(11.0, palette::TEXT));
    surface.fill_text(&format!("e {:+.1}", pid.error), tf.point(106.0, 84.0), &label(9.0, palette::AXIS_LABEL));

    // Three terms
    let terms = [("P", pid.p), ("I", pid.i), ("D", pid.d)];
    for (row, (name, value)) in terms.iter().enumerate() {
        let y = 14.0 + row as f32 * 32.0;
        surface.stroke_line(tf.point(116.0, 58.0), tf.point(150.0, y + 13.0), &wire);
        surface.fill_rect(tf.rect(150.0, y, 80.0, 26.0), TERM_COLORS[row].with_alpha(0.18));
        surface.fill_text(
            &format!("{name} {value:+.3}"),
            tf.point(190.0, y + 17.0),
            &label(10.0, TERM_COLORS[row]),
        );
        surface.stroke_line(tf.point(230.0, y + 13.0), tf.point(262.0, 58.0), &wire);
    }
    surface.fill_circle(tf.point(272.0, 58.0), tf.len(10.0), palette::STEEL);
    surface.fill_text("+", tf.point(272.0, 62.0), &label(11.0, palette::TEXT));
    surface.stroke_line(tf.point(282.0, 58.0), tf.point(320.0, 58.0), &wire);

    // Output bar
    let output = pid.output.clamp(0.0, 1.0) as f32;
    surface.fill_rect(tf.rect(320.0, 14.0, 24.0, 90.0), palette::STEEL);
    surface.fill_rect(
        tf.rect(320.0, 14.0 + 90.0 * (1.0 - output), 24.0, 90.0 * output),
        TERM_COLORS[3],
    );
    surface.fill_text(&format!("{:.0}%", output * 100.0), tf.point(332.0, 118.0), &label(10.0, TERM_COLORS[3]));

    // Feedback path from the pit back into the junction
    surface.stroke_line(tf.point(344.0, 58.0), tf.point(380.0, 58.0), &wire);
    surface.stroke_line(tf.point(380.0, 58.0), tf.point(380.0, 126.0), &wire);
    surface.stroke_line(tf.point(380.0, 126.0), tf.point(106.0, 126.0), &wire);
    surface.stroke_line(tf.point(106.0, 126.0), tf.point(106.0, 68.0), &wire);
    let pv = if is_valid_reading(live.temp) {
        format!("PV {:.0}\u{00B0}", live.temp)
    } else {
        "PV --".to_string()
    };
    surface.fill_text(&pv, tf.point(243.0, 122.0), &label(10.0, palette::TEMPERATURE));

    draw_sparklines(surface, &tf, history);

    // Auger cycle progress
    surface.fill_rect(tf.rect(20.0, 282.0, 360.0, 8.0), palette::STEEL);
    surface.fill_rect(
        tf.rect(20.0, 282.0, 360.0 * pid.cycle_progress() as f32, 8.0),
        palette::STEEL_LIGHT,
    );

    let banners = draw_banners(surface, &tf, live);
    SceneOutcome::Drawn { banners }
}

fn draw_sparklines(surface: &mut dyn DrawSurface, tf: &SceneTransform, history: &PidHistory) {
    let (x0, y0, width, height) = (20.0, 145.0, 360.0, 125.0);
    surface.fill_rect(tf.rect(x0, y0, width, height), palette::GRID.with_alpha(0.5));
    let mid = y0 + height / 2.0;
    surface.stroke_line(
        tf.point(x0, mid),
        tf.point(x0 + width, mid),
        &Stroke::dashed(palette::AXIS_LABEL, tf.len(0.5), tf.len(3.0), tf.len(3.0)),
    );
    if history.len() < 2 {
        return;
    }

    let magnitude = history.magnitude().max(1e-3);
    let n = history.len();
    let pick: [fn(&PidSample) -> f64; 4] = [
        |s| s.proportional,
        |s| s.integral,
        |s| s.derivative,
        |s| s.output,
    ];
    for (series, value_of) in pick.iter().enumerate() {
        let mut path = Path::new();
        for (i, sample) in history.iter().enumerate() {
            let v = value_of(sample);
            if !v.is_finite() {
                continue;
            }
            let x = x0 + width * i as f32 / (n - 1) as f32;
            let y = mid - (v / magnitude) as f32 * (height / 2.0 - 4.0);
            if path.is_empty() {
                path.move_to(tf.point(x, y));
            } else {
                path.line_to(tf.point(x, y));
            }
        }
        surface.stroke_path(&path, &Stroke::solid(TERM_COLORS[series], tf.len(1.5)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::surface::recording::RecordingSurface;
    use crate::domain::device::PidTelemetry;

    fn live(state: ControllerState, pid: Option<PidTelemetry>) -> LiveScalars {
        LiveScalars {
            temp: 221.0,
            setpoint: 225.0,
            state,
            auger: true,
            fan: false,
            igniter: false,
            errors: 0,
            runtime_ms: 754_000,
            pid,
        }
    }

    #[test]
    fn test_transform_fits_smaller_ratio_and_centers() {
        let tf = SceneTransform::fit(800.0, 300.0);
        assert_eq!(tf.scale, 1.0);
        assert_eq!(tf.offset_x, 200.0);
        assert_eq!(tf.offset_y, 0.0);

        let tf = SceneTransform::fit(200.0, 600.0);
        assert_eq!(tf.scale, 0.5);
        assert_eq!(tf.point(400.0, 300.0), Point::new(200.0, 225.0 + 150.0));
    }

    #[test]
    fn test_angles_advance_only_while_flag_is_on() {
        let mut scene = SceneState::default();
        let mut scalars = live(ControllerState::Running, None);
        scene.advance(0.5, &scalars);
        assert!(scene.auger_angle > 0.0);
        assert_eq!(scene.fan_angle, 0.0);

        let held = scene.auger_angle;
        scalars.auger = false;
        scene.advance(0.5, &scalars);
        assert_eq!(scene.auger_angle, held);

        scalars.auger = true;
        scene.advance(0.1, &scalars);
        assert!((scene.auger_angle - (held + AUGER_RAD_PER_SEC * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_banners_follow_live_state() {
        let pool = ParticlePool::with_seed(4, 4, 1);
        let scene = SceneState::default();
        let pid = PidTelemetry {
            lid_open: true,
            reignite_attempts: 2,
            ..Default::default()
        };
        let scalars = live(ControllerState::Reignite, Some(pid));
        let mut surface = RecordingSurface::new(400.0, 300.0);

        let outcome = render_smoker_scene(&mut surface, Some(&scalars), &scene, &pool);
        assert_eq!(
            outcome,
            SceneOutcome::Drawn {
                banners: vec!["LID OPEN".to_string(), "REIGNITE ATTEMPT 2".to_string()]
            }
        );
        assert!(surface.has_text("221\u{00B0}"));
        assert!(surface.has_text("SET 225\u{00B0}"));
    }

    #[test]
    fn test_no_banners_in_steady_run() {
        let pool = ParticlePool::with_seed(4, 4, 1);
        let scalars = live(ControllerState::Running, Some(PidTelemetry::default()));
        let mut surface = RecordingSurface::new(400.0, 300.0);
        let outcome = render_smoker_scene(&mut surface, Some(&scalars), &SceneState::default(), &pool);
        assert_eq!(outcome, SceneOutcome::Drawn { banners: vec![] });
    }

    #[test]
    fn test_cook_runtime_is_shown() {
        let pool = ParticlePool::with_seed(4, 4, 1);
        let scalars = live(ControllerState::Running, None);
        let mut surface = RecordingSurface::new(400.0, 300.0);
        render_smoker_scene(&mut surface, Some(&scalars), &SceneState::default(), &pool);
        assert!(surface.has_text("12:34"));
    }

    #[test]
    fn test_invalid_reading_shows_dashes() {
        let pool = ParticlePool::with_seed(4, 4, 1);
        let mut scalars = live(ControllerState::Running, None);
        scalars.temp = 1500.0;
        let mut surface = RecordingSurface::new(400.0, 300.0);
        render_smoker_scene(&mut surface, Some(&scalars), &SceneState::default(), &pool);
        assert!(surface.has_text("--"));
        assert!(!surface.has_text("1500"));
    }

    #[test]
    fn test_particles_are_drawn_scaled() {
        let mut pool = ParticlePool::with_seed(4, 4, 1);
        pool.spawn(ParticleClass::Fire, 140.0, 204.0);
        pool.spawn(ParticleClass::Smoke, 298.0, 48.0);
        let mut with = RecordingSurface::new(800.0, 600.0);
        let mut without = RecordingSurface::new(800.0, 600.0);
        let scalars = live(ControllerState::Running, None);

        render_smoker_scene(&mut with, Some(&scalars), &SceneState::default(), &pool);
        render_smoker_scene(&mut without, Some(&scalars), &SceneState::default(), &ParticlePool::with_seed(4, 4, 1));
        assert_eq!(with.circles(), without.circles() + 2);
    }

    #[test]
    fn test_zero_sized_surface_is_skipped() {
        let pool = ParticlePool::with_seed(4, 4, 1);
        let mut surface = RecordingSurface::new(300.0, 0.0);
        let outcome = render_smoker_scene(&mut surface, None, &SceneState::default(), &pool);
        assert_eq!(outcome, SceneOutcome::Skipped);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_pid_diagram_skips_without_pid_block() {
        let mut surface = RecordingSurface::new(400.0, 300.0);
        let scalars = live(ControllerState::Running, None);
        let outcome = render_pid_diagram(&mut surface, Some(&scalars), &PidHistory::default());
        assert_eq!(outcome, SceneOutcome::NoTelemetry);
        assert!(surface.has_text("No controller telemetry"));
    }

    #[test]
    fn test_pid_diagram_shows_terms_and_sparklines() {
        let pid = PidTelemetry {
            p: 0.583,
            i: 0.12,
            d: -0.04,
            output: 0.66,
            error: -5.0,
            cycle_time: 20_000,
            cycle_elapsed: 10_000,
            ..Default::default()
        };
        let mut history = PidHistory::default();
        for _ in 0..5 {
            history.push(pid.sample());
        }
        let scalars = live(ControllerState::Running, Some(pid));
        let mut surface = RecordingSurface::new(400.0, 300.0);

        let outcome = render_pid_diagram(&mut surface, Some(&scalars), &history);
        assert!(matches!(outcome, SceneOutcome::Drawn { .. }));
        assert!(surface.has_text("P +0.583"));
        assert!(surface.has_text("D -0.040"));
        assert!(surface.has_text("66%"));
        assert!(surface.has_text("e -5.0"));
        // One path per sparkline series.
        assert_eq!(surface.paths().len(), 4);
    }
}
