//! Per-process threshold/duration state machine
//!
//! A pid is Normal while absent from the map, Elevated once a reading reaches the
//! threshold, and Alerted after it stayed there for the configured duration. Any
//! tick where the pid is not above the threshold (including disappearing) returns
//! it to Normal.

use super::delta::UsageReading;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TrackedProcess {
    pub elevated_since: Instant,
    pub alerted: bool,
    pub name: String,
    pub cpu_percent: f64,
}

impl TrackedProcess {
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.elevated_since)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaisedAlert {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub elapsed: Duration,
}

/// Why an alerted process left the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// Dropped below the threshold or exited.
    Recovered,
    /// Monitoring stopped while the process was still alerted.
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    Raise(RaisedAlert),
    Clear { pid: u32, reason: ClearReason },
}

impl AlertEvent {
    pub fn pid(&self) -> u32 {
        match self {
            AlertEvent::Raise(alert) => alert.pid,
            AlertEvent::Clear { pid, .. } => *pid,
        }
    }
}

#[derive(Debug)]
pub struct ThresholdTracker {
    cpu_threshold: f64,
    duration_threshold: Duration,
    tracked: HashMap<u32, TrackedProcess>,
}

impl ThresholdTracker {
    pub fn new(cpu_threshold: f64, duration_threshold: Duration) -> Self {
        Self {
            cpu_threshold,
            duration_threshold,
            tracked: HashMap::new(),
        }
    }

    /// Applies one tick of readings and returns the resulting events in ascending pid order.
    pub fn update(&mut self, readings: &[UsageReading], now: Instant) -> Vec<AlertEvent> {
        let mut events = BTreeMap::new();
        let mut above = HashSet::with_capacity(readings.len());
        let threshold = self.cpu_threshold;

        for reading in readings.iter().filter(|r| r.cpu_percent >= threshold) {
            above.insert(reading.pid);
            let Some(entry) = self.tracked.get_mut(&reading.pid) else {
                self.tracked.insert(
                    reading.pid,
                    TrackedProcess {
                        elevated_since: now,
                        alerted: false,
                        name: reading.name.clone(),
                        cpu_percent: reading.cpu_percent,
                    },
                );
                continue;
            };

            entry.name.clone_from(&reading.name);
            entry.cpu_percent = reading.cpu_percent;
            let elapsed = entry.elapsed(now);
            if !entry.alerted && elapsed >= self.duration_threshold {
                entry.alerted = true;
                events.insert(
                    reading.pid,
                    AlertEvent::Raise(RaisedAlert {
                        pid: reading.pid,
                        name: reading.name.clone(),
                        cpu_percent: reading.cpu_percent,
                        elapsed,
                    }),
                );
            }
        }

        let dropped: Vec<u32> = self
            .tracked
            .keys()
            .filter(|pid| !above.contains(pid))
            .copied()
            .collect();
        for pid in dropped {
            if let Some(entry) = self.tracked.remove(&pid) {
                if entry.alerted {
                    events.insert(pid, AlertEvent::Clear { pid, reason: ClearReason::Recovered });
                }
            }
        }

        events.into_values().collect()
    }

    /// Drops every tracked entry, returning stop clears for the alerted ones.
    pub fn clear_all(&mut self) -> Vec<AlertEvent> {
        let mut pids: Vec<u32> = self
            .tracked
            .drain()
            .filter(|(_, entry)| entry.alerted)
            .map(|(pid, _)| pid)
            .collect();
        pids.sort_unstable();
        pids.into_iter()
            .map(|pid| AlertEvent::Clear { pid, reason: ClearReason::Stopped })
            .collect()
    }

    pub fn tracked(&self) -> &HashMap<u32, TrackedProcess> {
        &self.tracked
    }

    pub fn get(&self, pid: u32) -> Option<&TrackedProcess> {
        self.tracked.get(&pid)
    }

    pub fn alerted_count(&self) -> usize {
        self.tracked.values().filter(|t| t.alerted).count()
    }

    pub fn elevated_count(&self) -> usize {
        self.tracked.len() - self.alerted_count()
    }
}
