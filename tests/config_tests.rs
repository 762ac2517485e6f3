//! Tests for bead.toml discovery, loading and CLI overrides.

use std::fs;

use beadsheet::config::{
    find_config_from, load_config, merge_cli_overrides, BeadConfig, CliOverrides, ConfigError,
};
use beadsheet::layout::Orientation;
use beadsheet::palettes::resolve_palette;
use tempfile::TempDir;

const FULL_CONFIG: &str = r##"
[pattern]
palette = "palettes/mine.json"
resolution = 20
partitions = 2
max_colors = 8
merge_threshold = 3
alpha_threshold = 100
restrict = ["K", "W"]

[outline]
width = 1
color = "K"

[page]
width = 1000
height = 1400
margin = 50
orientation = "wide"
max_legend_columns = 4
"##;

const MINE_PALETTE: &str = r##"{
  "name": "mine",
  "colors": [
    { "code": "K", "hex": "#000000" },
    { "code": "W", "hex": "#ffffff" }
  ]
}"##;

#[test]
fn test_full_config_round_trips_into_options() {
    let temp = TempDir::new().expect("should create temp dir");
    let path = temp.path().join("bead.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let loaded = load_config(Some(&path)).unwrap();
    let config = &loaded.config;
    assert_eq!(config.pattern.partitions, 2);
    assert_eq!(config.page.orientation, Orientation::Wide);

    let options = config.pattern_options();
    assert_eq!(options.grid_size(), Some(40));
    assert_eq!(options.max_colors, Some(8));
    assert_eq!(options.alpha_threshold, 100);
    assert_eq!(options.restrict.as_deref(), Some(&["K".to_string(), "W".to_string()][..]));
    assert_eq!(options.outline.as_ref().map(|o| o.code.as_str()), Some("K"));

    let page = config.page.to_page_spec();
    assert_eq!((page.width, page.height, page.margin), (1000.0, 1400.0, 50.0));
    assert_eq!(page.max_legend_columns, 4);
}

#[test]
fn test_palette_path_resolves_next_to_config() {
    let temp = TempDir::new().expect("should create temp dir");
    fs::create_dir(temp.path().join("palettes")).unwrap();
    fs::write(temp.path().join("palettes").join("mine.json"), MINE_PALETTE).unwrap();
    let path = temp.path().join("bead.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let loaded = load_config(Some(&path)).unwrap();
    let palette = resolve_palette(&loaded.config.pattern.palette, loaded.base_dir()).unwrap();
    assert_eq!(palette.name(), "mine");
    assert_eq!(palette.get("W").map(|c| c.hex.as_str()), Some("#FFFFFF"));
}

#[test]
fn test_discovery_from_nested_directory() {
    let temp = TempDir::new().expect("should create temp dir");
    let path = temp.path().join("bead.toml");
    fs::write(&path, "[pattern]\nresolution = 12\n").unwrap();
    let nested = temp.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let found = find_config_from(nested).expect("should find config");
    assert_eq!(found, path);
    let loaded = load_config(Some(&found)).unwrap();
    assert_eq!(loaded.config.pattern.resolution, 12);
}

#[test]
fn test_invalid_values_are_reported_together() {
    let temp = TempDir::new().expect("should create temp dir");
    let path = temp.path().join("bead.toml");
    fs::write(&path, "[pattern]\npartitions = 0\n[page]\nwidth = -5\n").unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    let ConfigError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.contains("pattern.partitions")));
    assert!(errors.iter().any(|e| e.contains("page.width")));
}

#[test]
fn test_cli_overrides_win() {
    let mut config = BeadConfig::default();
    let overrides = CliOverrides {
        palette: Some("grayscale".into()),
        max_colors: Some(5),
        outline_color: Some("G7".into()),
        margin: Some(10.0),
        ..Default::default()
    };
    merge_cli_overrides(&mut config, &overrides).unwrap();
    assert_eq!(config.pattern.palette, "grayscale");
    assert_eq!(config.pattern.max_colors, Some(5));
    assert_eq!(config.outline.color, "G7");
    assert_eq!(config.page.margin, 10.0);
    assert_eq!(config.pattern.resolution, 29);
}
