use scorebar::config::{validate_layout_tag, AppConfig, ConfigManager, MAX_BAR_CELLS};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.display.bar_width, 2);
    assert_eq!(config.display.bar_gap, 1);
    assert!(config.display.show_panel);
    assert_eq!(config.image.layouts, vec!["".to_string(), "_bin".to_string()]);
    assert_eq!(config.image.default_layout, "");
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.theme.colors.bar_selected, "yellow");
    assert!(!config.debug.enabled);
    assert!(config.debug.log_file.is_none());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[display]"));
    assert!(template.contains("[image]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_default_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config: AppConfig =
        toml::from_str(&config_manager.generate_default_config()).expect("template parses");
    assert!(config.validate().is_ok());
    assert_eq!(config.display.bar_width, 2);
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    fs::write(&first_path, "garbage").unwrap();

    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    let content = fs::read_to_string(&second_path).unwrap();
    assert!(content.contains("[display]"));
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = config_manager.load_config().expect("Should load defaults");
    assert_eq!(config.version, "0.1");
}

#[test]
fn test_load_minimal_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
version = "0.1"

[display]
bar_width = 4

[image]
layouts = ["", "_dot", "_bin"]
"#,
    )
    .unwrap();

    let config = config_manager.load_config().expect("Should parse");
    assert_eq!(config.display.bar_width, 4);
    assert_eq!(config.display.bar_gap, 1);
    assert_eq!(config.image.layouts.len(), 3);
}

#[test]
fn test_load_invalid_toml() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(config_manager.config_path("config.toml"), "[display\n").unwrap();

    let err = config_manager.load_config().unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.display.bar_width = 3;
    override_config.image.default_layout = "_bin".to_string();
    override_config.theme.colors.bar = "blue".to_string();
    override_config.debug.enabled = true;

    base.merge(override_config);

    assert_eq!(base.display.bar_width, 3);
    assert_eq!(base.image.default_layout, "_bin");
    assert_eq!(base.theme.colors.bar, "blue");
    assert!(base.debug.enabled);

    // Unmodified values remain default
    assert_eq!(base.display.bar_gap, 1);
    assert_eq!(base.theme.colors.bar_selected, "yellow");
}

#[test]
fn test_validate_config_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..Default::default()
    };

    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unsupported config version"));
}

#[test]
fn test_validate_config_zero_bar_width() {
    let mut config = AppConfig::default();
    config.display.bar_width = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_config_empty_layouts() {
    let mut config = AppConfig::default();
    config.image.layouts.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_config_invalid_color_mode() {
    let mut config = AppConfig::default();
    config.theme.color_mode = "neon".to_string();
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Invalid color_mode"));
}

#[test]
fn test_layout_tags() {
    assert!(validate_layout_tag("").is_ok());
    assert!(validate_layout_tag("_bin").is_ok());
    assert!(validate_layout_tag("-dot").is_ok());
    assert!(validate_layout_tag("/etc").is_err());
    assert!(validate_layout_tag("..").is_err());
    assert!(validate_layout_tag("a\\b").is_err());
}

#[test]
fn test_validate_config_bar_geometry_bounds() {
    let config: AppConfig = toml::from_str("[display]\nbar_gap = 65535").unwrap();
    let mut merged = AppConfig::default();
    merged.merge(config);
    assert!(merged
        .validate()
        .unwrap_err()
        .to_string()
        .contains("bar_gap must be at most"));

    let mut config = AppConfig::default();
    config.display.bar_width = MAX_BAR_CELLS + 1;
    assert!(config.validate().is_err());

    config.display.bar_width = MAX_BAR_CELLS;
    config.display.bar_gap = MAX_BAR_CELLS;
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_data_dir() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    assert!(AppConfig::load_with(&config_manager)
        .unwrap()
        .image
        .data_dir
        .is_none());

    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "[image]\ndata_dir = \"/srv/results\"\n",
    )
    .unwrap();

    let config = AppConfig::load_with(&config_manager).unwrap();
    assert_eq!(config.image.data_dir, Some(PathBuf::from("/srv/results")));
    assert_eq!(config.image.layouts.len(), 2);
}

#[test]
fn test_load_with_reports_malformed_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "[display]\nbar_width = \"wide\"\n",
    )
    .unwrap();

    let err = AppConfig::load_with(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_load_with_rejects_invalid_values() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "[image]\ndefault_layout = \"../x\"\n",
    )
    .unwrap();

    assert!(AppConfig::load_with(&config_manager).is_err());
}
