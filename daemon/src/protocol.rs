//! IPC protocol definitions (JSON messages)

use crate::engine::{ClearReason, EngineStatus, RaisedAlert};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    Ping,
    GetStatus,
    ListUsage,
    GetConfig,
    PauseMonitoring,
    ResumeMonitoring,
    GetAutostart,
    SetAutostart { params: SetAutostartParams },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAutostartParams {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Pong,
    Response { id: Option<String>, data: serde_json::Value },
    Alert { data: AlertData },
    Cleared { data: ClearedData },
    Status { data: StatusData },
    Config { data: ConfigData },
}

impl Response {
    pub fn data(data: serde_json::Value) -> Self {
        Response::Response { id: None, data }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::data(serde_json::json!({"error": message.to_string()}))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertData {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub elapsed_seconds: u64,
}

impl From<&RaisedAlert> for AlertData {
    fn from(alert: &RaisedAlert) -> Self {
        AlertData {
            pid: alert.pid,
            name: alert.name.clone(),
            cpu_percent: alert.cpu_percent,
            elapsed_seconds: alert.elapsed.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedData {
    pub pid: u32,
    pub reason: ClearReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusData {
    pub paused: bool,
    pub monitored_count: u32,
    pub step: u32,
    pub steps: u32,
    pub color: String,
    pub elevated_count: u32,
    pub alerted_count: u32,
    pub tracked: Vec<TrackedData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedData {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub elapsed_seconds: f64,
    pub alerted: bool,
}

impl StatusData {
    pub fn from_engine(status: EngineStatus, paused: bool, monitored_count: usize) -> Self {
        StatusData {
            paused,
            monitored_count: monitored_count as u32,
            step: status.step as u32,
            steps: status.steps as u32,
            color: status.color,
            elevated_count: status.elevated_count as u32,
            alerted_count: status.alerted_count as u32,
            tracked: status
                .tracked
                .into_iter()
                .map(|t| TrackedData {
                    pid: t.pid,
                    name: t.name,
                    cpu_percent: t.cpu_percent,
                    elapsed_seconds: t.elapsed_seconds,
                    alerted: t.alerted,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigData {
    pub cpu_threshold_percent: f64,
    pub duration_seconds: u64,
    pub tick_interval_seconds: u64,
    pub progress_steps: u32,
    pub noise_floor_percent: f64,
}

impl From<&crate::config::Config> for ConfigData {
    fn from(config: &crate::config::Config) -> Self {
        ConfigData {
            cpu_threshold_percent: config.detection.cpu.threshold_percent,
            duration_seconds: config.detection.cpu.duration_seconds,
            tick_interval_seconds: config.general.tick_interval_seconds,
            progress_steps: config.indicator.progress_steps as u32,
            noise_floor_percent: config.detection.cpu.noise_floor_percent,
        }
    }
}
