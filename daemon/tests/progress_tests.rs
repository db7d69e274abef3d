mod common;

use common::secs;
use cpuwatch_daemon::engine::{compute_step, step_color, Rgb, TrackedProcess};
use std::collections::HashMap;
use std::time::{Duration, Instant};

fn tracked_since(entries: &[(u32, Instant)]) -> HashMap<u32, TrackedProcess> {
    entries
        .iter()
        .map(|(pid, since)| {
            (
                *pid,
                TrackedProcess {
                    elevated_since: *since,
                    alerted: false,
                    name: String::new(),
                    cpu_percent: 100.0,
                },
            )
        })
        .collect()
}

#[test]
fn test_empty_is_zero() {
    assert_eq!(compute_step(&HashMap::new(), Instant::now(), secs(60), 12), 0);
}

#[test]
fn test_full_at_or_past_threshold() {
    let t0 = Instant::now();
    let tracked = tracked_since(&[(1, t0)]);
    assert_eq!(compute_step(&tracked, t0 + secs(60), secs(60), 12), 12);
    assert_eq!(compute_step(&tracked, t0 + secs(600), secs(60), 12), 12);
}

#[test]
fn test_uses_longest_episode() {
    let t0 = Instant::now();
    let tracked = tracked_since(&[(1, t0 + secs(50)), (2, t0 + secs(20)), (3, t0 + secs(55))]);
    // longest is 40s of 60s -> 8 of 12
    assert_eq!(compute_step(&tracked, t0 + secs(60), secs(60), 12), 8);
}

#[test]
fn test_rounds_to_nearest_step() {
    let t0 = Instant::now();
    let tracked = tracked_since(&[(1, t0)]);
    // 2.4s of 60s = 0.48 steps -> 0; 2.6s -> 0.52 -> 1
    assert_eq!(compute_step(&tracked, t0 + Duration::from_millis(2_400), secs(60), 12), 0);
    assert_eq!(compute_step(&tracked, t0 + Duration::from_millis(2_600), secs(60), 12), 1);
    assert_eq!(compute_step(&tracked, t0 + secs(30), secs(60), 12), 6);
}

#[test]
fn test_monotonic_in_elapsed() {
    let t0 = Instant::now();
    let tracked = tracked_since(&[(1, t0)]);
    let mut last = 0;
    for ms in (0..=90_000).step_by(250) {
        let step = compute_step(&tracked, t0 + Duration::from_millis(ms), secs(60), 12);
        assert!(step >= last);
        assert!(step <= 12);
        last = step;
    }
    assert_eq!(last, 12);
}

#[test]
fn test_zero_duration_is_full() {
    let t0 = Instant::now();
    let tracked = tracked_since(&[(1, t0)]);
    assert_eq!(compute_step(&tracked, t0, Duration::ZERO, 12), 12);
}

#[test]
fn test_color_grade() {
    assert_eq!(step_color(0, 12), Rgb { r: 0, g: 255, b: 0 });
    assert_eq!(step_color(6, 12), Rgb { r: 255, g: 255, b: 0 });
    assert_eq!(step_color(12, 12), Rgb { r: 255, g: 0, b: 0 });
    assert_eq!(step_color(3, 12).hex(), "#80ff00");
    assert_eq!(step_color(12, 12).hex(), "#ff0000");
}
