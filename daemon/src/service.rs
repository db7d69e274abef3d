//! Daemon-side glue: alert fan-out and IPC request handling

use crate::autostart::Autostart;
use crate::config::Config;
use crate::engine::{ClearReason, RaisedAlert};
use crate::monitor::Monitor;
use crate::notifier::{AlertSink, DesktopNotifier};
use crate::protocol::{AlertData, ClearedData, ConfigData, Request, Response};
use crate::socket::RequestHandler;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Forwards engine events to the desktop and to every connected client.
pub struct DaemonSink {
    desktop: Option<DesktopNotifier>,
    broadcast_tx: broadcast::Sender<String>,
}

impl DaemonSink {
    pub fn new(desktop: Option<DesktopNotifier>, broadcast_tx: broadcast::Sender<String>) -> Self {
        Self { desktop, broadcast_tx }
    }

    fn broadcast(&self, response: &Response) {
        if let Ok(json) = serde_json::to_string(response) {
            let _ = self.broadcast_tx.send(json);
        }
    }
}

impl AlertSink for DaemonSink {
    fn on_raise(&mut self, alert: &RaisedAlert) {
        if let Some(desktop) = self.desktop.as_mut() {
            desktop.on_raise(alert);
        }
        self.broadcast(&Response::Alert { data: AlertData::from(alert) });
    }

    fn on_clear(&mut self, pid: u32, reason: ClearReason) {
        if let Some(desktop) = self.desktop.as_mut() {
            desktop.on_clear(pid, reason);
        }
        self.broadcast(&Response::Cleared { data: ClearedData { pid, reason } });
    }
}

pub struct DaemonState {
    monitor: Arc<Monitor>,
    config: Config,
    autostart: Option<Autostart>,
}

impl DaemonState {
    pub fn new(monitor: Arc<Monitor>, config: Config, autostart: Option<Autostart>) -> Self {
        Self { monitor, config, autostart }
    }

    fn autostart_response(&self) -> Response {
        match &self.autostart {
            Some(autostart) => Response::data(serde_json::json!({"enabled": autostart.is_enabled()})),
            None => Response::error("Autostart is unavailable"),
        }
    }
}

#[async_trait::async_trait]
impl RequestHandler for DaemonState {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => Response::Status { data: self.monitor.status().await },

            Request::ListUsage => {
                let data: Vec<_> = self
                    .monitor
                    .usage()
                    .await
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "pid": r.pid,
                            "name": r.name,
                            "cpu_percent": r.cpu_percent,
                        })
                    })
                    .collect();
                Response::data(serde_json::json!(data))
            }

            Request::GetConfig => Response::Config { data: ConfigData::from(&self.config) },

            Request::PauseMonitoring => {
                self.monitor.pause().await;
                Response::data(serde_json::json!({"success": true}))
            }

            Request::ResumeMonitoring => {
                self.monitor.resume().await;
                Response::data(serde_json::json!({"success": true}))
            }

            Request::GetAutostart => self.autostart_response(),

            Request::SetAutostart { params } => match &self.autostart {
                Some(autostart) => match autostart.set(params.enabled) {
                    Ok(()) => {
                        info!("Run on login {}", if params.enabled { "enabled" } else { "disabled" });
                        self.autostart_response()
                    }
                    Err(e) => Response::error(e),
                },
                None => Response::error("Autostart is unavailable"),
            },
        }
    }
}
