//! Converts consecutive raw samples into CPU usage percentages

use crate::collector::ProcessSample;
use std::collections::HashMap;
use std::time::Duration;

const MIN_WALL_DELTA: Duration = Duration::from_nanos(1);

#[derive(Debug, Clone, PartialEq)]
pub struct UsageReading {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
}

impl UsageReading {
    /// Whether the reading clears the display noise floor.
    pub fn is_significant(&self, noise_floor: f64) -> bool {
        self.cpu_percent >= noise_floor
    }
}

#[derive(Debug, Default)]
pub struct DeltaCalculator {
    previous: HashMap<u32, ProcessSample>,
}

impl DeltaCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes readings for every pid seen on the previous call too, then replaces
    /// the previous-sample table with `current`.
    ///
    /// A pid with no previous sample (or whose start stamp changed) only seeds its
    /// baseline and yields no reading this call.
    pub fn compute(&mut self, current: &[ProcessSample]) -> Vec<UsageReading> {
        let readings = current
            .iter()
            .filter_map(|sample| {
                let prev = self.previous.get(&sample.pid)?;
                if is_reused(prev, sample) {
                    return None;
                }
                Some(UsageReading {
                    pid: sample.pid,
                    name: sample.name.clone(),
                    cpu_percent: cpu_percent(prev, sample),
                })
            })
            .collect();

        self.previous = current.iter().map(|s| (s.pid, s.clone())).collect();
        readings
    }

    /// Forgets every baseline; the next `compute` is a priming call.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    pub fn baseline_count(&self) -> usize {
        self.previous.len()
    }
}

fn is_reused(prev: &ProcessSample, current: &ProcessSample) -> bool {
    matches!((prev.start_time, current.start_time), (Some(a), Some(b)) if a != b)
}

/// `delta_cpu / delta_wall * 100`, with negative CPU deltas clamped to zero and the
/// wall delta floored at one nanosecond.
pub fn cpu_percent(prev: &ProcessSample, current: &ProcessSample) -> f64 {
    let delta_cpu = current.cpu_time.saturating_sub(prev.cpu_time);
    let delta_wall = current
        .wall_time
        .saturating_duration_since(prev.wall_time)
        .max(MIN_WALL_DELTA);
    delta_cpu.as_nanos() as f64 / delta_wall.as_nanos() as f64 * 100.0
}
