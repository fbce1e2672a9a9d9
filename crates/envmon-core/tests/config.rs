use envmon_core::config::{Config, ConfigError, StorageConfig, READINGS_FILE, STATE_FILE};
use envmon_core::metrics::SeriesField;
use envmon_core::reading::{NewReading, SensorData};
use envmon_core::state::StateUpdate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("envmon").join("config.json");

    let mut config = Config::default();
    config.bind = "0.0.0.0:8080".to_string();
    config.chart_fields = vec![SeriesField::Temperature, SeriesField::Rain];
    config.demo.enabled = true;
    config.demo.seed = Some(9);
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_resolve_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"poll_interval_ms": 250}"#).unwrap();

    let (config, used) = Config::resolve(Some(path.clone())).unwrap();
    assert_eq!(config.poll_interval_ms, 250);
    assert_eq!(used, Some(path));
}

#[test]
fn test_resolve_missing_explicit_path_fails() {
    let dir = TempDir::new().unwrap();
    let result = Config::resolve(Some(dir.path().join("missing.json")));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"poll_interval_ms": 0}"#).unwrap();

    assert!(matches!(
        Config::load(&path),
        Err(ConfigError::InvalidValue {
            field: "poll_interval_ms",
            ..
        })
    ));
}

#[test]
fn test_file_storage_opens_both_stores() {
    let dir = TempDir::new().unwrap();
    let storage = StorageConfig::File {
        dir: dir.path().join("store"),
    };

    {
        let (readings, state) = storage.open(100).unwrap();
        readings
            .insert(NewReading::new(SensorData {
                lux: Some(12.0),
                ..Default::default()
            }))
            .unwrap();
        state
            .update(StateUpdate {
                open: Some(true),
                ..Default::default()
            })
            .unwrap();
    }

    assert!(dir.path().join("store").join(READINGS_FILE).exists());
    assert!(dir.path().join("store").join(STATE_FILE).exists());

    let (readings, state) = storage.open(100).unwrap();
    assert_eq!(readings.len().unwrap(), 1);
    assert!(state.get().unwrap().open);
}

#[test]
fn test_memory_storage_starts_empty() {
    let (readings, state) = StorageConfig::Memory.open(10).unwrap();
    assert!(readings.is_empty().unwrap());
    assert!(!state.get().unwrap().open);
}
