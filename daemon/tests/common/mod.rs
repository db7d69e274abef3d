#![allow(dead_code)]

use cpuwatch_daemon::collector::ProcessSample;
use cpuwatch_daemon::engine::{ClearReason, RaisedAlert};
use cpuwatch_daemon::notifier::AlertSink;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Raise { pid: u32, name: String, elapsed: Duration },
    Clear { pid: u32, reason: ClearReason },
}

/// Sink that records every call; clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn raises(&self, pid: u32) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Raise { pid: p, .. } if *p == pid))
            .count()
    }

    pub fn clears(&self, pid: u32) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Clear { pid: p, .. } if *p == pid))
            .count()
    }
}

impl AlertSink for RecordingSink {
    fn on_raise(&mut self, alert: &RaisedAlert) {
        self.events.lock().unwrap().push(Event::Raise {
            pid: alert.pid,
            name: alert.name.clone(),
            elapsed: alert.elapsed,
        });
    }

    fn on_clear(&mut self, pid: u32, reason: ClearReason) {
        self.events.lock().unwrap().push(Event::Clear { pid, reason });
    }
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

pub fn sample(pid: u32, name: &str, cpu_time: Duration, wall_time: Instant) -> ProcessSample {
    ProcessSample {
        pid,
        name: name.to_string(),
        cpu_time,
        wall_time,
        start_time: None,
    }
}

/// Simulated host process whose CPU counter advances by `load` (0.0..=1.0 per core)
/// of every wall-clock second.
pub struct FakeProcess {
    pub pid: u32,
    pub name: String,
    pub load: f64,
    pub cpu_time: Duration,
    pub start_time: Option<u64>,
}

impl FakeProcess {
    pub fn new(pid: u32, name: &str, load: f64) -> Self {
        Self {
            pid,
            name: name.to_string(),
            load,
            cpu_time: Duration::ZERO,
            start_time: None,
        }
    }

    pub fn advance(&mut self, wall: Duration) {
        self.cpu_time += wall.mul_f64(self.load);
    }

    pub fn sample(&self, at: Instant) -> ProcessSample {
        ProcessSample {
            pid: self.pid,
            name: self.name.clone(),
            cpu_time: self.cpu_time,
            wall_time: at,
            start_time: self.start_time,
        }
    }
}

/// Advances every process by `step` and samples them all at `at`.
pub fn advance_all(procs: &mut [FakeProcess], step: Duration, at: Instant) -> Vec<ProcessSample> {
    procs
        .iter_mut()
        .map(|p| {
            p.advance(step);
            p.sample(at)
        })
        .collect()
}
