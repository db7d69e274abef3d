//! Configuration management (TOML)

use crate::engine::EngineConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_interval_seconds: u64,
    pub desktop_notifications: bool,
    pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetectionConfig {
    #[serde(default)]
    pub cpu: CpuDetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuDetectionConfig {
    pub threshold_percent: f64,
    pub duration_seconds: u64,
    pub noise_floor_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub progress_steps: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            tick_interval_seconds: 5,
            desktop_notifications: true,
            app_name: "CPU Monitor".to_string(),
        }
    }
}

impl Default for CpuDetectionConfig {
    fn default() -> Self {
        CpuDetectionConfig {
            threshold_percent: 90.0,
            duration_seconds: 60,
            noise_floor_percent: 1.0,
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig { progress_steps: 12 }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cpu = &self.detection.cpu;
        if cpu.threshold_percent.is_nan() || cpu.threshold_percent <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "detection.cpu.threshold_percent",
                reason: format!("must be positive, got {}", cpu.threshold_percent),
            });
        }
        if cpu.noise_floor_percent.is_nan() || cpu.noise_floor_percent < 0.0 {
            return Err(ConfigError::Invalid {
                field: "detection.cpu.noise_floor_percent",
                reason: format!("must not be negative, got {}", cpu.noise_floor_percent),
            });
        }
        if self.general.tick_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "general.tick_interval_seconds",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.indicator.progress_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "indicator.progress_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.general.tick_interval_seconds)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cpu_threshold: self.detection.cpu.threshold_percent,
            duration_threshold: Duration::from_secs(self.detection.cpu.duration_seconds),
            progress_steps: self.indicator.progress_steps,
            noise_floor: self.detection.cpu.noise_floor_percent,
        }
    }

    pub fn config_path() -> std::path::PathBuf {
        directories::ProjectDirs::from("", "", "cpuwatch")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| std::path::PathBuf::from("config.toml"))
    }
}
