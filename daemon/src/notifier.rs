//! Alert delivery: the sink interface and the desktop notification sender

use crate::engine::{ClearReason, RaisedAlert};
use notify_rust::{Notification, Timeout, Urgency};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const CLEARED_TIMEOUT_MS: u32 = 5_000;

/// Receives raise/clear events from the engine, synchronously and in order.
///
/// Sinks must tolerate pids they have never seen and repeated clears.
pub trait AlertSink: Send {
    fn on_raise(&mut self, alert: &RaisedAlert);
    fn on_clear(&mut self, pid: u32, reason: ClearReason);
}

/// Body of the notice replacing an alert, if the reason warrants one. A stop says
/// nothing about the process, so it gets no notice.
pub fn clear_body(pid: u32, reason: ClearReason) -> Option<String> {
    match reason {
        ClearReason::Recovered => Some(format!("PID {} dropped below the alert threshold", pid)),
        ClearReason::Stopped => None,
    }
}

pub fn alert_body(alert: &RaisedAlert, duration_threshold: Duration) -> String {
    format!(
        "{} (PID {}) has been using {:.0}% CPU for over {}s",
        alert.name,
        alert.pid,
        alert.cpu_percent,
        duration_threshold.as_secs()
    )
}

/// Posts freedesktop notifications, remembering each alert's notification id so
/// the clear can replace it.
pub struct DesktopNotifier {
    app_name: String,
    duration_threshold: Duration,
    active: HashMap<u32, u32>,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, duration_threshold: Duration) -> Self {
        Self {
            app_name: app_name.into(),
            duration_threshold,
            active: HashMap::new(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl AlertSink for DesktopNotifier {
    fn on_raise(&mut self, alert: &RaisedAlert) {
        let body = alert_body(alert, self.duration_threshold);
        info!(pid = alert.pid, name = %alert.name, cpu = alert.cpu_percent, "high CPU alert");

        let mut notification = Notification::new();
        notification
            .summary("High CPU Usage")
            .body(&body)
            .icon("dialog-warning")
            .appname(&self.app_name)
            .urgency(Urgency::Critical);
        if let Some(id) = self.active.get(&alert.pid) {
            notification.id(*id);
        }

        match notification.show() {
            Ok(handle) => {
                self.active.insert(alert.pid, handle.id());
            }
            Err(e) => warn!("Failed to show notification for PID {}: {}", alert.pid, e),
        }
    }

    fn on_clear(&mut self, pid: u32, reason: ClearReason) {
        let Some(id) = self.active.remove(&pid) else {
            return;
        };
        let Some(body) = clear_body(pid, reason) else {
            // Leave the alert on screen; monitoring stopped while it was still true.
            debug!(pid, "forgetting alert notification {} on stop", id);
            return;
        };
        info!(pid, "high CPU alert cleared");

        let result = Notification::new()
            .id(id)
            .summary("CPU usage back to normal")
            .body(&body)
            .icon("dialog-information")
            .appname(&self.app_name)
            .urgency(Urgency::Low)
            .timeout(Timeout::Milliseconds(CLEARED_TIMEOUT_MS))
            .show();
        if let Err(e) = result {
            warn!("Failed to replace notification for PID {}: {}", pid, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_names_process_and_duration() {
        let alert = RaisedAlert {
            pid: 31337,
            name: "yes".to_string(),
            cpu_percent: 99.6,
            elapsed: Duration::from_secs(62),
        };
        assert_eq!(
            alert_body(&alert, Duration::from_secs(60)),
            "yes (PID 31337) has been using 100% CPU for over 60s"
        );
    }

    #[test]
    fn clear_for_unknown_pid_is_noop() {
        let mut notifier = DesktopNotifier::new("test", Duration::from_secs(60));
        notifier.on_clear(12, ClearReason::Recovered);
        notifier.on_clear(12, ClearReason::Stopped);
        assert_eq!(notifier.active_count(), 0);
    }

    #[test]
    fn stop_posts_no_recovery_notice() {
        assert_eq!(clear_body(7, ClearReason::Stopped), None);
        assert_eq!(
            clear_body(7, ClearReason::Recovered).as_deref(),
            Some("PID 7 dropped below the alert threshold")
        );
    }
}
