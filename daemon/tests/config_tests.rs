use cpuwatch_daemon::config::Config;
use cpuwatch_daemon::error::ConfigError;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.general.tick_interval_seconds, 5);
    assert_eq!(config.detection.cpu.threshold_percent, 90.0);
    assert_eq!(config.detection.cpu.duration_seconds, 60);
    assert_eq!(config.indicator.progress_steps, 12);
    assert!(config.validate().is_ok());
}

#[test]
fn test_engine_config_from_defaults() {
    let engine = Config::default().engine_config();
    assert_eq!(engine.cpu_threshold, 90.0);
    assert_eq!(engine.duration_threshold, Duration::from_secs(60));
    assert_eq!(engine.progress_steps, 12);
    assert_eq!(engine.noise_floor, 1.0);
}

#[test]
fn test_load_from_toml() {
    let toml_content = r#"
[general]
tick_interval_seconds = 2
desktop_notifications = false

[detection.cpu]
threshold_percent = 75.5
duration_seconds = 30

[indicator]
progress_steps = 6
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml_content.as_bytes()).unwrap();
    let config = Config::load(file.path()).unwrap();
    assert!(!config.general.desktop_notifications);
    assert_eq!(config.tick_interval(), Duration::from_secs(2));
    assert_eq!(config.detection.cpu.threshold_percent, 75.5);
    assert_eq!(config.detection.cpu.duration_seconds, 30);
    // Unspecified keys fall back to defaults
    assert_eq!(config.detection.cpu.noise_floor_percent, 1.0);
    assert_eq!(config.general.app_name, "CPU Monitor");
    assert_eq!(config.indicator.progress_steps, 6);
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.general.tick_interval_seconds, 5);
    assert_eq!(config.detection.cpu.threshold_percent, 90.0);
}

#[test]
fn test_zero_interval_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[general]\ntick_interval_seconds = 0\n").unwrap();
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "general.tick_interval_seconds", .. }));
}

#[test]
fn test_invalid_threshold_rejected() {
    let mut config = Config::default();
    config.detection.cpu.threshold_percent = 0.0;
    assert!(config.validate().is_err());
    config.detection.cpu.threshold_percent = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_progress_steps_rejected() {
    let mut config = Config::default();
    config.indicator.progress_steps = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "indicator.progress_steps", .. })
    ));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[general\n").unwrap();
    assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_save_config() {
    let mut config = Config::default();
    config.detection.cpu.duration_seconds = 45;
    let file = NamedTempFile::new().unwrap();
    config.save(file.path()).unwrap();
    let loaded = Config::load(file.path()).unwrap();
    assert_eq!(loaded.detection.cpu.duration_seconds, 45);
    assert_eq!(loaded.general.desktop_notifications, config.general.desktop_notifications);
}
