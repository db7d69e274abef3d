//! Visual progress toward the alert duration, used to pick a tray icon frame

use super::tracker::TrackedProcess;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Step 0..=`steps` reflecting the longest-running elevation episode.
pub fn compute_step(
    tracked: &HashMap<u32, TrackedProcess>,
    now: Instant,
    duration_threshold: Duration,
    steps: usize,
) -> usize {
    let Some(max_elapsed) = tracked.values().map(|t| t.elapsed(now)).max() else {
        return 0;
    };
    let progress = if duration_threshold.is_zero() {
        1.0
    } else {
        (max_elapsed.as_secs_f64() / duration_threshold.as_secs_f64()).clamp(0.0, 1.0)
    };
    (progress * steps as f64).round() as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Green at step 0, yellow halfway, red at `steps`.
pub fn step_color(step: usize, steps: usize) -> Rgb {
    let t = if steps == 0 {
        0.0
    } else {
        (step.min(steps) as f64) / steps as f64
    };
    let r = (t * 2.0).min(1.0);
    let g = ((1.0 - t) * 2.0).min(1.0);
    Rgb {
        r: (r * 255.0).round() as u8,
        g: (g * 255.0).round() as u8,
        b: 0,
    }
}
