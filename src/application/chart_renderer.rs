// Temperature chart - state bands, grid, transition markers, target and current lines
use crate::application::axis::{
    format_ago, nice_time_step, nice_value_step, time_ticks, value_ticks, ValueAxis,
};
use crate::application::sample_store::StoreSlice;
use crate::application::surface::{DrawSurface, Path, Point, Rect, Stroke, TextAlign, TextStyle};
use crate::domain::color::palette;
use crate::domain::telemetry::Sample;

const PAD_LEFT: f32 = 42.0;
const PAD_RIGHT: f32 = 12.0;
const PAD_TOP: f32 = 14.0;
const PAD_BOTTOM: f32 = 24.0;
const MIN_TIME_SPAN: i64 = 30;
const VALUE_MAX_TICKS: usize = 5;
const BAND_ALPHA: f32 = 0.06;
/// Event labels closer than this to the previous label are not drawn.
pub const EVENT_LABEL_MIN_GAP: f32 = 40.0;
const NOW_THRESHOLD_SECS: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    /// Zero-sized surface, nothing drawn.
    Skipped,
    /// Fewer than two samples, only the placeholder was drawn.
    CollectingData,
    Drawn(ChartLayout),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub value_axis: ValueAxis,
    pub value_step: f64,
    pub time_min: i64,
    pub time_max: i64,
    pub time_step: i64,
    pub labeled_events: usize,
    pub current_label: Option<String>,
}

struct Frame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    time_min: i64,
    time_max: i64,
    axis: ValueAxis,
}

impl Frame {
    fn x(&self, t: i64) -> f32 {
        let span = (self.time_max - self.time_min) as f32;
        self.left + (t - self.time_min) as f32 / span * self.width
    }

    fn y(&self, value: f64) -> f32 {
        let frac = (value - self.axis.min) / self.axis.span();
        self.top + (1.0 - frac as f32) * self.height
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

pub fn render_chart(surface: &mut dyn DrawSurface, slice: StoreSlice<'_>) -> ChartOutcome {
    if !surface.is_drawable() {
        return ChartOutcome::Skipped;
    }
    let (w, h) = surface.size();
    surface.clear(palette::BACKGROUND);

    if !slice.is_plottable() {
        surface.fill_text(
            "Collecting data\u{2026}",
            Point::new(w / 2.0, h / 2.0),
            &TextStyle::new(palette::PLACEHOLDER, 13.0, TextAlign::Center),
        );
        return ChartOutcome::CollectingData;
    }

    let samples = slice.samples;
    let time_min = samples[0].time;
    let time_max = samples[samples.len() - 1].time.max(time_min + MIN_TIME_SPAN);
    let frame = Frame {
        left: PAD_LEFT,
        top: PAD_TOP,
        width: (w - PAD_LEFT - PAD_RIGHT).max(1.0),
        height: (h - PAD_TOP - PAD_BOTTOM).max(1.0),
        time_min,
        time_max,
        axis: ValueAxis::fit(samples),
    };

    draw_state_bands(surface, &frame, samples);
    let value_step = draw_value_grid(surface, &frame, w);
    let time_step = draw_time_grid(surface, &frame, h);
    let labeled_events = draw_event_markers(surface, &frame, slice);
    draw_target_line(surface, &frame, samples);
    draw_current_line(surface, &frame, samples);
    let current_label = draw_current_label(surface, &frame, samples);

    ChartOutcome::Drawn(ChartLayout {
        value_axis: frame.axis,
        value_step,
        time_min,
        time_max,
        time_step,
        labeled_events,
        current_label,
    })
}

fn draw_state_bands(surface: &mut dyn DrawSurface, frame: &Frame, samples: &[Sample]) {
    for pair in samples.windows(2) {
        let x0 = frame.x(pair[0].time);
        let x1 = frame.x(pair[1].time);
        if x1 <= x0 {
            continue;
        }
        surface.fill_rect(
            Rect::new(x0, frame.top, x1 - x0, frame.height),
            pair[0].state.color().with_alpha(BAND_ALPHA),
        );
    }
}

fn draw_value_grid(surface: &mut dyn DrawSurface, frame: &Frame, width: f32) -> f64 {
    let grid = Stroke::solid(palette::GRID, 0.5);
    let label = TextStyle::new(palette::AXIS_LABEL, 10.0, TextAlign::Right);
    let step = nice_value_step(frame.axis.span(), VALUE_MAX_TICKS);

    for v in value_ticks(frame.axis.min, frame.axis.max, step) {
        let y = frame.y(v);
        surface.stroke_line(Point::new(frame.left, y), Point::new(width - PAD_RIGHT, y), &grid);
        surface.fill_text(
            &format!("{}\u{00B0}", v.round() as i64),
            Point::new(frame.left - 4.0, y + 3.0),
            &label,
        );
    }
    step
}

fn draw_time_grid(surface: &mut dyn DrawSurface, frame: &Frame, height: f32) -> i64 {
    let grid = Stroke::solid(palette::GRID, 0.5);
    let label = TextStyle::new(palette::AXIS_LABEL, 10.0, TextAlign::Center);
    let step = nice_time_step(frame.time_max - frame.time_min);

    for t in time_ticks(frame.time_min, frame.time_max, step) {
        let x = frame.x(t);
        surface.stroke_line(Point::new(x, frame.top), Point::new(x, frame.bottom()), &grid);
        let ago = frame.time_max - t;
        let text = if ago < NOW_THRESHOLD_SECS {
            "now".to_string()
        } else {
            format_ago(ago)
        };
        surface.fill_text(&text, Point::new(x, height - 4.0), &label);
    }
    step
}

/// Returns how many markers got a label.
fn draw_event_markers(surface: &mut dyn DrawSurface, frame: &Frame, slice: StoreSlice<'_>) -> usize {
    let mut last_label_x = f32::NEG_INFINITY;
    let mut labeled = 0;

    for event in slice.events {
        if event.time < frame.time_min || event.time > frame.time_max {
            continue;
        }
        let x = frame.x(event.time);
        let color = event.state.color();
        surface.stroke_line(
            Point::new(x, frame.top),
            Point::new(x, frame.bottom()),
            &Stroke::dashed(color.with_alpha(0.4), 1.0, 3.0, 3.0),
        );

        if x - last_label_x >= EVENT_LABEL_MIN_GAP {
            surface.fill_text(
                event.state.name(),
                Point::new(x, frame.top - 2.0),
                &TextStyle::new(color.with_alpha(0.7), 9.0, TextAlign::Center),
            );
            last_label_x = x;
            labeled += 1;
        }
    }
    labeled
}

fn draw_target_line(surface: &mut dyn DrawSurface, frame: &Frame, samples: &[Sample]) {
    let mut path = Path::new();
    for (i, s) in samples.iter().enumerate() {
        let p = Point::new(frame.x(s.time), frame.y(s.target));
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    surface.stroke_path(
        &path,
        &Stroke::dashed(palette::SETPOINT.with_alpha(0.6), 1.5, 6.0, 4.0),
    );
}

fn draw_current_line(surface: &mut dyn DrawSurface, frame: &Frame, samples: &[Sample]) {
    let mut path = Path::new();
    let mut started = false;
    for s in samples {
        if !s.has_valid_reading() {
            started = false;
            continue;
        }
        let p = Point::new(frame.x(s.time), frame.y(s.current));
        if started {
            path.line_to(p);
        } else {
            path.move_to(p);
            started = true;
        }
    }
    if !path.is_empty() {
        surface.stroke_path(&path, &Stroke::solid(palette::TEMPERATURE, 2.0));
    }
}

fn draw_current_label(
    surface: &mut dyn DrawSurface,
    frame: &Frame,
    samples: &[Sample],
) -> Option<String> {
    let last = samples.iter().rev().find(|s| s.has_valid_reading())?;
    let text = format!("{:.0}\u{00B0}", last.current);
    surface.fill_text(
        &text,
        Point::new(frame.x(last.time) + 4.0, frame.y(last.current) + 4.0),
        &TextStyle::new(palette::TEMPERATURE, 11.0, TextAlign::Left).bold(),
    );
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::surface::recording::{DrawCall, RecordingSurface};
    use crate::domain::controller_state::ControllerState::{self, *};
    use crate::domain::telemetry::StateEvent;

    fn s(time: i64, current: f64, state: ControllerState) -> Sample {
        Sample::new(time, current, 225.0, state)
    }

    fn slice<'a>(samples: &'a [Sample], events: &'a [StateEvent]) -> StoreSlice<'a> {
        StoreSlice { samples, events }
    }

    fn drawn(outcome: ChartOutcome) -> ChartLayout {
        match outcome {
            ChartOutcome::Drawn(layout) => layout,
            other => panic!("expected a drawn chart, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_sized_surface_is_skipped() {
        let samples = [s(0, 200.0, Running), s(10, 205.0, Running)];
        let mut surface = RecordingSurface::new(0.0, 200.0);
        assert_eq!(render_chart(&mut surface, slice(&samples, &[])), ChartOutcome::Skipped);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_single_sample_draws_placeholder_only() {
        let samples = [s(0, 200.0, Running)];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        let outcome = render_chart(&mut surface, slice(&samples, &[]));
        assert_eq!(outcome, ChartOutcome::CollectingData);
        assert_eq!(surface.texts(), vec!["Collecting data\u{2026}"]);
        assert!(surface.lines().is_empty());
        assert!(surface.paths().is_empty());
    }

    #[test]
    fn test_invalid_reading_breaks_line_and_skips_label() {
        let samples = [
            s(0, 200.0, Running),
            s(10, 205.0, Running),
            s(20, 1500.0, Running),
            s(30, 210.0, Running),
            s(40, 1500.0, Running),
        ];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        let layout = drawn(render_chart(&mut surface, slice(&samples, &[])));

        let (current, _) = surface
            .paths()
            .into_iter()
            .find(|(_, stroke)| stroke.dash.is_none())
            .expect("current line");
        assert_eq!(current.subpath_count(), 2);
        assert_eq!(current.lines().count(), 1);

        assert_eq!(layout.current_label.as_deref(), Some("210\u{00B0}"));
        assert!(!surface.has_text("1500"));
    }

    #[test]
    fn test_target_line_is_dashed_and_continuous() {
        let samples = [s(0, 1500.0, Running), s(10, 205.0, Running), s(20, 210.0, Running)];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        render_chart(&mut surface, slice(&samples, &[]));

        let (target, stroke) = surface
            .paths()
            .into_iter()
            .find(|(_, stroke)| stroke.dash.is_some())
            .expect("target line");
        assert_eq!(stroke.dash, Some((6.0, 4.0)));
        assert_eq!(target.subpath_count(), 1);
        assert_eq!(target.lines().count(), 2);
    }

    #[test]
    fn test_background_bands_use_starting_state() {
        let samples = [s(0, 100.0, Startup), s(10, 150.0, Running), s(20, 200.0, Running)];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        render_chart(&mut surface, slice(&samples, &[]));

        let bands = surface.rects();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].1, Startup.color().with_alpha(BAND_ALPHA));
        assert_eq!(bands[1].1, Running.color().with_alpha(BAND_ALPHA));
    }

    #[test]
    fn test_close_event_labels_are_suppressed_but_lines_drawn() {
        let samples: Vec<Sample> = (0..=60).map(|i| s(i * 10, 200.0, Running)).collect();
        // 600s over 346px: 10s is under 6px, 100s is about 58px.
        let events = [
            StateEvent::new(100, Startup),
            StateEvent::new(110, Running),
            StateEvent::new(120, Error),
            StateEvent::new(300, Cooldown),
        ];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        let layout = drawn(render_chart(&mut surface, slice(&samples, &events)));

        assert_eq!(layout.labeled_events, 2);
        assert!(surface.has_text("Startup"));
        assert!(surface.has_text("Cooldown"));
        assert!(!surface.texts().contains(&"Running"));
        assert!(!surface.texts().contains(&"Error"));

        let dashed_markers = surface
            .lines()
            .into_iter()
            .filter(|(_, _, stroke)| stroke.dash == Some((3.0, 3.0)))
            .count();
        assert_eq!(dashed_markers, 4);
    }

    #[test]
    fn test_events_outside_window_are_ignored() {
        let samples = [s(100, 200.0, Running), s(200, 205.0, Running)];
        let events = [StateEvent::new(50, Startup)];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        let layout = drawn(render_chart(&mut surface, slice(&samples, &events)));
        assert_eq!(layout.labeled_events, 0);
    }

    #[test]
    fn test_short_span_is_widened_and_grid_labels_in_range() {
        let samples = [s(0, 225.0, Running), s(4, 225.0, Running)];
        let mut surface = RecordingSurface::new(400.0, 200.0);
        let layout = drawn(render_chart(&mut surface, slice(&samples, &[])));

        assert_eq!(layout.time_max - layout.time_min, 30);
        assert_eq!(layout.value_axis, ValueAxis { min: 210.0, max: 240.0 });
        assert!(surface.has_text("now"));
        assert!(surface.has_text("240\u{00B0}"));
    }

    #[test]
    fn test_grid_lines_stay_inside_plot() {
        let samples: Vec<Sample> = (0..=120).map(|i| s(i * 10, 150.0 + i as f64, Running)).collect();
        let mut surface = RecordingSurface::new(500.0, 260.0);
        let layout = drawn(render_chart(&mut surface, slice(&samples, &[])));

        assert_eq!(layout.time_step, 300);
        for call in &surface.calls {
            if let DrawCall::Line(a, b, _) = call {
                assert!(a.y >= PAD_TOP - 0.01 && b.y <= 260.0 - PAD_BOTTOM + 0.01);
            }
        }
    }
}
