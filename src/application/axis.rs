// Axis scaling - nice tick steps for the value and time axes
use crate::domain::telemetry::Sample;

/// Smallest step from `{1, 2, 5, 10} x 10^k` that keeps `range / step` at or
/// below `max_ticks`.
pub fn nice_value_step(range: f64, max_ticks: usize) -> f64 {
    let max_ticks = max_ticks.max(1) as f64;
    if !range.is_finite() || range <= 0.0 {
        return 1.0;
    }

    let rough = range / max_ticks;
    let magnitude = 10f64.powf(rough.log10().floor());
    let normalized = rough / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    let step = nice * magnitude;
    if step.is_finite() && step > 0.0 { step } else { 1.0 }
}

/// Tick spacing in seconds for a visible time span.
pub fn nice_time_step(range_secs: i64) -> i64 {
    match range_secs {
        r if r < 120 => 30,
        r if r < 600 => 60,
        r if r < 1800 => 300,
        r if r < 3600 => 600,
        r if r < 7200 => 900,
        r if r < 21600 => 1800,
        _ => 3600,
    }
}

/// Multiples of `step` inside `[min, max]`.
pub fn value_ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    let first = (min / step).floor() as i64;
    let last = (max / step).ceil() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|v| *v >= min && *v <= max)
        .collect()
}

pub fn time_ticks(min: i64, max: i64, step: i64) -> Vec<i64> {
    if step <= 0 || max < min {
        return Vec::new();
    }
    let first = min.div_euclid(step) + i64::from(min.rem_euclid(step) != 0);
    (first..)
        .map(|k| k * step)
        .take_while(|t| *t <= max)
        .collect()
}

/// "15s" / "12m" style relative label.
pub fn format_ago(secs: i64) -> String {
    if secs < 60 {
        format!("{}s", secs.max(0))
    } else {
        format!("{}m", (secs as f64 / 60.0).round() as i64)
    }
}

pub const MIN_VALUE_PADDING: f64 = 10.0;
pub const VALUE_PADDING_FRACTION: f64 = 0.15;
pub const MIN_VALUE_SPAN: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub min: f64,
    pub max: f64,
}

impl ValueAxis {
    /// Auto-scale over valid readings and all targets.
    pub fn fit(samples: &[Sample]) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for s in samples {
            if s.has_valid_reading() {
                lo = lo.min(s.current);
                hi = hi.max(s.current);
            }
            if s.target.is_finite() {
                lo = lo.min(s.target);
                hi = hi.max(s.target);
            }
        }
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 0.0;
        }
        Self::padded(lo, hi)
    }

    pub fn padded(lo: f64, hi: f64) -> Self {
        let pad = MIN_VALUE_PADDING.max((hi - lo) * VALUE_PADDING_FRACTION);
        let mut min = ((lo - pad) / 10.0).floor() * 10.0;
        let mut max = ((hi + pad) / 10.0).ceil() * 10.0;
        if max - min < MIN_VALUE_SPAN {
            min -= 10.0;
            max += 10.0;
        }
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}
