//! CPU monitoring engine: sample deltas, threshold tracking and progress

pub mod delta;
pub mod progress;
pub mod tracker;

pub use delta::{DeltaCalculator, UsageReading};
pub use progress::{compute_step, step_color, Rgb};
pub use tracker::{AlertEvent, ClearReason, RaisedAlert, ThresholdTracker, TrackedProcess};

use crate::collector::ProcessSample;
use crate::notifier::AlertSink;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cpu_threshold: f64,
    pub duration_threshold: Duration,
    pub progress_steps: usize,
    pub noise_floor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cpu_threshold: 90.0,
            duration_threshold: Duration::from_secs(60),
            progress_steps: 12,
            noise_floor: 1.0,
        }
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub readings: Vec<UsageReading>,
    pub events: Vec<AlertEvent>,
    pub step: usize,
    pub process_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedStatus {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub elapsed_seconds: f64,
    pub alerted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub step: usize,
    pub steps: usize,
    pub color: String,
    pub elevated_count: usize,
    pub alerted_count: usize,
    pub tracked: Vec<TrackedStatus>,
}

/// Owns the previous-sample table and the tracked-process map for one monitoring
/// session. Callers must serialize access; `tick` is not reentrant.
pub struct Engine {
    config: EngineConfig,
    deltas: DeltaCalculator,
    tracker: ThresholdTracker,
    last_readings: Vec<UsageReading>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let tracker = ThresholdTracker::new(config.cpu_threshold, config.duration_threshold);
        Self {
            config,
            deltas: DeltaCalculator::new(),
            tracker,
            last_readings: Vec::new(),
        }
    }

    pub fn tick(&mut self, samples: &[ProcessSample], now: Instant, sink: &mut dyn AlertSink) -> TickReport {
        let readings = self.deltas.compute(samples);
        let events = self.tracker.update(&readings, now);
        dispatch(&events, sink);

        let step = self.step(now);
        debug!(
            processes = samples.len(),
            readings = readings.len(),
            tracked = self.tracker.tracked().len(),
            step,
            "tick complete"
        );

        self.last_readings.clone_from(&readings);
        TickReport {
            readings,
            events,
            step,
            process_count: samples.len(),
        }
    }

    /// Ends the session: clears alerted processes through `sink` as
    /// [`ClearReason::Stopped`] and forgets every baseline so the next tick only primes.
    pub fn stop(&mut self, sink: &mut dyn AlertSink) -> Vec<AlertEvent> {
        let events = self.tracker.clear_all();
        dispatch(&events, sink);
        self.deltas.reset();
        self.last_readings.clear();
        events
    }

    pub fn step(&self, now: Instant) -> usize {
        compute_step(
            self.tracker.tracked(),
            now,
            self.config.duration_threshold,
            self.config.progress_steps,
        )
    }

    pub fn status(&self, now: Instant) -> EngineStatus {
        let step = self.step(now);
        let mut tracked: Vec<TrackedStatus> = self
            .tracker
            .tracked()
            .iter()
            .map(|(pid, t)| TrackedStatus {
                pid: *pid,
                name: t.name.clone(),
                cpu_percent: t.cpu_percent,
                elapsed_seconds: t.elapsed(now).as_secs_f64(),
                alerted: t.alerted,
            })
            .collect();
        tracked.sort_by_key(|t| t.pid);

        EngineStatus {
            step,
            steps: self.config.progress_steps,
            color: step_color(step, self.config.progress_steps).hex(),
            elevated_count: self.tracker.elevated_count(),
            alerted_count: self.tracker.alerted_count(),
            tracked,
        }
    }

    /// Readings from the last tick above the noise floor, busiest first.
    pub fn significant_readings(&self) -> Vec<UsageReading> {
        let mut readings: Vec<UsageReading> = self
            .last_readings
            .iter()
            .filter(|r| r.is_significant(self.config.noise_floor))
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
        readings
    }

    pub fn tracker(&self) -> &ThresholdTracker {
        &self.tracker
    }
}

fn dispatch(events: &[AlertEvent], sink: &mut dyn AlertSink) {
    for event in events {
        match event {
            AlertEvent::Raise(alert) => sink.on_raise(alert),
            AlertEvent::Clear { pid, reason } => sink.on_clear(*pid, *reason),
        }
    }
}
