use std::path::PathBuf;

use tempfile::TempDir;
use tourview_settings::{AlgorithmType, Config, SettingsError, SettingsPersistence};

#[test]
fn test_save_and_reload_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut persistence = SettingsPersistence::new(&path);
    persistence.config_mut().ui.viewport_width = 1280;
    persistence.config_mut().solver.algorithm = AlgorithmType::NearestNeighbour;
    persistence
        .config_mut()
        .add_recent_file(PathBuf::from("berlin52.tsp"));
    persistence.save().unwrap();

    let reloaded = SettingsPersistence::load(&path).unwrap();
    assert_eq!(reloaded.config(), persistence.config());
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.render.marker_size_px = 3.5;
    config.save_to_file(&path).unwrap();

    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.ui.poll_interval_ms = 0;
    assert!(matches!(
        config.save_to_file(&path),
        Err(SettingsError::Config(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_load_or_default_tolerates_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    let persistence = SettingsPersistence::load_or_default(&path);
    assert_eq!(persistence.config(), &Config::default());

    assert!(matches!(
        SettingsPersistence::load(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = TempDir::new().unwrap();
    let persistence = SettingsPersistence::load_or_default(dir.path().join("absent.toml"));
    assert_eq!(persistence.config(), &Config::default());
}
