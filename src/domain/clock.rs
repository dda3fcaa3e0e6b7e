// Device clock reconciliation
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct ClockBaseline {
    pub device_time_at_fetch: i64,
    pub local_at_fetch: Instant,
}

/// Projects device uptime from a single baseline plus elapsed local time.
///
/// The baseline only moves on a history fetch. Rate differences between the
/// two clocks are not corrected, so the estimate drifts linearly until the
/// next fetch.
#[derive(Debug, Clone, Default)]
pub struct ClockReconciler {
    baseline: Option<ClockBaseline>,
}

impl ClockReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebase(&mut self, device_now: i64, local_now: Instant) {
        self.baseline = Some(ClockBaseline {
            device_time_at_fetch: device_now,
            local_at_fetch: local_now,
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.baseline.is_some()
    }

    /// Estimated device time in fractional seconds, `None` before a baseline.
    pub fn project(&self, local_now: Instant) -> Option<f64> {
        let baseline = self.baseline?;
        let elapsed = local_now.saturating_duration_since(baseline.local_at_fetch);
        Some(baseline.device_time_at_fetch as f64 + elapsed.as_secs_f64())
    }

    /// Whole-second projection used for sample timestamps.
    pub fn project_secs(&self, local_now: Instant) -> Option<i64> {
        self.project(local_now).map(|t| t.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_uninitialized_projects_nothing() {
        let clock = ClockReconciler::new();
        assert!(!clock.is_initialized());
        assert_eq!(clock.project(Instant::now()), None);
    }

    #[test]
    fn test_projection_tracks_local_elapsed() {
        let fetched_at = Instant::now();
        let mut clock = ClockReconciler::new();
        clock.rebase(10, fetched_at);

        assert_eq!(clock.project_secs(fetched_at), Some(10));
        assert_eq!(clock.project_secs(fetched_at + Duration::from_millis(5000)), Some(15));
        let est = clock.project(fetched_at + Duration::from_millis(2500)).unwrap();
        assert!((est - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_projection_is_monotonic() {
        let fetched_at = Instant::now();
        let mut clock = ClockReconciler::new();
        clock.rebase(1_000, fetched_at);

        let mut previous = f64::MIN;
        for ms in (0..60_000).step_by(700) {
            let est = clock.project(fetched_at + Duration::from_millis(ms)).unwrap();
            assert!(est >= previous);
            previous = est;
        }
    }

    #[test]
    fn test_instant_before_baseline_does_not_go_backwards() {
        let earlier = Instant::now();
        let fetched_at = earlier + Duration::from_secs(3);
        let mut clock = ClockReconciler::new();
        clock.rebase(50, fetched_at);
        assert_eq!(clock.project_secs(earlier), Some(50));
    }

    #[test]
    fn test_rebase_replaces_baseline() {
        let t0 = Instant::now();
        let mut clock = ClockReconciler::new();
        clock.rebase(100, t0);
        let later = t0 + Duration::from_secs(30);
        clock.rebase(128, later);
        // Immediately after a re-fetch the estimate equals the reported device time.
        assert_eq!(clock.project_secs(later), Some(128));
    }
}
