use super::{ProcessCollector, ProcessSample};
use std::fs;
use std::time::{Duration, Instant};

const NANOS_PER_SEC: u64 = 1_000_000_000;

pub struct LinuxProcessCollector {
    clock_ticks: u64,
}

impl LinuxProcessCollector {
    pub fn new() -> Self {
        let clock_ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        Self {
            clock_ticks: if clock_ticks > 0 { clock_ticks as u64 } else { 100 },
        }
    }

    fn ticks_to_duration(&self, ticks: u64) -> Duration {
        let secs = ticks / self.clock_ticks;
        let rem = ticks % self.clock_ticks;
        Duration::from_secs(secs) + Duration::from_nanos(rem * NANOS_PER_SEC / self.clock_ticks)
    }

    /// Reads a single process, `None` if it is gone or its stat is unreadable.
    pub fn get_process(&self, pid: u32) -> Option<ProcessSample> {
        self.parse_process(pid)
    }

    fn parse_process(&self, pid: u32) -> Option<ProcessSample> {
        let stat = fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
        let wall_time = Instant::now();
        let (name, fields) = parse_stat(&stat)?;

        // Indices are relative to the field after the comm, so state is 0.
        let utime: u64 = fields.get(11)?.parse().ok()?;
        let stime: u64 = fields.get(12)?.parse().ok()?;
        let start_time: Option<u64> = fields.get(19).and_then(|s| s.parse().ok());

        Some(ProcessSample {
            pid,
            name,
            cpu_time: self.ticks_to_duration(utime + stime),
            wall_time,
            start_time,
        })
    }
}

/// Splits `/proc/<pid>/stat` into the comm name and the remaining fields.
/// The comm may contain spaces and parentheses, so it ends at the last ')'.
fn parse_stat(content: &str) -> Option<(String, Vec<&str>)> {
    let open = content.find('(')?;
    let close = content.rfind(')')?;
    if close < open {
        return None;
    }
    let name = content[open + 1..close].to_string();
    let fields = content.get(close + 1..)?.split_whitespace().collect();
    Some((name, fields))
}

impl Default for LinuxProcessCollector {
    fn default() -> Self { Self::new() }
}

impl ProcessCollector for LinuxProcessCollector {
    fn sample(&self) -> Vec<ProcessSample> {
        let mut processes = Vec::new();
        if let Ok(entries) = fs::read_dir("/proc") {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(pid) = name.parse::<u32>() {
                        // Processes can exit between readdir and read; skip them.
                        if let Some(sample) = self.parse_process(pid) {
                            processes.push(sample);
                        }
                    }
                }
            }
        }
        processes
    }
}
