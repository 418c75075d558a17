use ao2vis::config::Settings;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_settings_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Settings::default()));
    let settings: Settings = figment.extract().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.io_threads, 4);
    assert_eq!(settings.readme.config_line_ratio, 0.5);
}

#[test]
fn test_settings_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
base_folders = ["/ao2/base", "/ao2/extra"]
io_threads = 8

[readme]
sample_lines = 20

[preview_overrides]
Phoenix = 3
"#;
    fs::write(&config_path, toml_content).unwrap();

    let settings = Settings::load_file_only(Some(&config_path)).unwrap();

    assert_eq!(
        settings.base_folders,
        vec![PathBuf::from("/ao2/base"), PathBuf::from("/ao2/extra")]
    );
    assert_eq!(settings.io_threads, 8);
    assert_eq!(settings.progress_interval, 24);
    assert_eq!(settings.readme.sample_lines, 20);
    assert_eq!(settings.readme.config_line_ratio, 0.5);
    assert_eq!(settings.preview_overrides.get("Phoenix"), Some(&3));
}

#[test]
fn test_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nprogress_interval = 10\n").unwrap();

    std::env::set_var("AO2VIS_TEST_IO_THREADS", "2");
    // Use double underscore for nesting
    std::env::set_var("AO2VIS_TEST_README__SAMPLE_LINES", "60");

    let figment = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("AO2VIS_TEST_").split("__"));
    let settings: Settings = figment.extract().unwrap();

    assert_eq!(settings.io_threads, 2);
    assert_eq!(settings.progress_interval, 10);
    assert_eq!(settings.readme.sample_lines, 60);

    // Clean up
    std::env::remove_var("AO2VIS_TEST_IO_THREADS");
    std::env::remove_var("AO2VIS_TEST_README__SAMPLE_LINES");
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let settings = Settings::load_file_only(Some(&temp_dir.path().join("absent.toml"))).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_invalid_value_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    let err = Settings::load_file_only(Some(&config_path)).unwrap_err();
    assert!(err.to_string().starts_with("Invalid configuration"));
}

#[test]
fn test_preview_override_persists() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "base_folders = [\"/ao2/base\"]\n").unwrap();

    let mut stored = Settings::load_file_only(Some(&config_path)).unwrap();
    stored.preview_overrides.insert("Maya".to_string(), 4);
    stored.save_to(&config_path).unwrap();

    let reloaded = Settings::load_file_only(Some(&config_path)).unwrap();
    assert_eq!(reloaded.base_folders, vec![PathBuf::from("/ao2/base")]);
    assert_eq!(reloaded.preview_overrides.get("Maya"), Some(&4));
}
