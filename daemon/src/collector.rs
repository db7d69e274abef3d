//! Raw per-process CPU counters (reads /proc on Linux)

mod linux;

pub use linux::LinuxProcessCollector;

use std::time::{Duration, Instant};

/// One process's raw counters at one tick.
#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// Accumulated user + system CPU time since the process started.
    pub cpu_time: Duration,
    pub wall_time: Instant,
    /// Start stamp used to tell a reused pid apart from the process that held it before.
    pub start_time: Option<u64>,
}

/// Supplies the full live-process set once per tick.
///
/// Implementations never fail: when the process table cannot be read they return
/// whatever they managed to collect, possibly nothing.
pub trait ProcessCollector: Send + Sync {
    fn sample(&self) -> Vec<ProcessSample>;
}
