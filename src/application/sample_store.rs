// Sample/event store - retention-bounded temperature history
use crate::domain::controller_state::ControllerState;
use crate::domain::telemetry::{Sample, StateEvent};

pub const DEFAULT_RETENTION_SECS: i64 = 3660;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleRange {
    Seconds(i64),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The store has not been seeded with history yet.
    Rejected,
    Appended { state_changed: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct StoreSlice<'a> {
    pub samples: &'a [Sample],
    pub events: &'a [StateEvent],
}

impl StoreSlice<'_> {
    pub fn is_plottable(&self) -> bool {
        self.samples.len() >= 2
    }
}

#[derive(Debug, Clone)]
pub struct SampleStore {
    samples: Vec<Sample>,
    events: Vec<StateEvent>,
    retention_secs: i64,
    seeded: bool,
}

impl SampleStore {
    pub fn new(retention_secs: i64) -> Self {
        Self {
            samples: Vec::new(),
            events: Vec::new(),
            retention_secs: retention_secs.max(1),
            seeded: false,
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn events(&self) -> &[StateEvent] {
        &self.events
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Replace the contents wholesale with a history payload.
    pub fn seed(&mut self, samples: Vec<Sample>, events: Vec<StateEvent>, device_now: i64) {
        let before = samples.len();
        self.samples = keep_ordered(samples, |s| s.time);
        self.events = keep_ordered(events, |e| e.time);
        if self.samples.len() != before {
            tracing::warn!(
                "Dropped {} out-of-order history samples",
                before - self.samples.len()
            );
        }
        self.seeded = true;

        let cutoff = device_now.saturating_sub(self.retention_secs);
        let stale = self
            .samples
            .iter()
            .take(self.samples.len().saturating_sub(1))
            .take_while(|s| s.time < cutoff)
            .count();
        if stale > 0 {
            self.samples.drain(..stale);
            if let Some(oldest) = self.samples.first().map(|s| s.time) {
                self.events.retain(|e| e.time > oldest);
            }
        }
        // A device clock behind its own samples still must not widen the window.
        self.trim();

        tracing::debug!(
            "Seeded store with {} samples, {} events (device now {})",
            self.samples.len(),
            self.events.len(),
            device_now
        );
    }

    pub fn append(
        &mut self,
        time: i64,
        current: f64,
        target: f64,
        state: ControllerState,
    ) -> AppendOutcome {
        if !self.seeded {
            return AppendOutcome::Rejected;
        }

        let previous = self.samples.last().copied();
        // Never let a projected timestamp run backwards past the newest sample.
        let time = previous.map_or(time, |p| time.max(p.time));
        self.samples.push(Sample::new(time, current, target, state));

        let state_changed = previous.is_some_and(|p| p.state != state);
        if state_changed {
            self.events.push(StateEvent::new(time, state));
        }

        self.trim();
        AppendOutcome::Appended { state_changed }
    }

    /// Suffix of the store within `range` of the newest sample.
    pub fn visible_slice(&self, range: VisibleRange) -> StoreSlice<'_> {
        let Some(newest) = self.samples.last().map(|s| s.time) else {
            return StoreSlice {
                samples: &[],
                events: &[],
            };
        };

        match range {
            VisibleRange::All => StoreSlice {
                samples: &self.samples,
                events: &self.events,
            },
            VisibleRange::Seconds(secs) => {
                let cutoff = newest.saturating_sub(secs.max(0));
                let first_sample = self.samples.partition_point(|s| s.time < cutoff);
                let first_event = self.events.partition_point(|e| e.time < cutoff);
                StoreSlice {
                    samples: &self.samples[first_sample..],
                    events: &self.events[first_event..],
                }
            }
        }
    }

    fn trim(&mut self) {
        let Some(newest) = self.samples.last().map(|s| s.time) else {
            return;
        };

        let expired = self
            .samples
            .iter()
            .take(self.samples.len() - 1)
            .take_while(|s| newest.saturating_sub(s.time) > self.retention_secs)
            .count();
        if expired == 0 {
            return;
        }
        self.samples.drain(..expired);

        // An event at the oldest retained sample has lost the sample it was a
        // transition from.
        let oldest = self.samples[0].time;
        let stale_events = self.events.partition_point(|e| e.time <= oldest);
        self.events.drain(..stale_events);
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_SECS)
    }
}

fn keep_ordered<T>(items: Vec<T>, time: impl Fn(&T) -> i64) -> Vec<T> {
    let mut ordered: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if ordered.last().is_none_or(|last| time(last) <= time(&item)) {
            ordered.push(item);
        }
    }
    ordered
}
