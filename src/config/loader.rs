//! Configuration loading and discovery for `bead.toml`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::schema::BeadConfig;
use crate::layout::Orientation;

/// File name searched for when no config path is given.
pub const CONFIG_FILE_NAME: &str = "bead.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bead.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", bullet_list(.0))]
    Validation(Vec<String>),
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub palette: Option<String>,
    pub resolution: Option<usize>,
    pub partitions: Option<usize>,
    pub max_colors: Option<usize>,
    pub merge_threshold: Option<usize>,
    pub alpha_threshold: Option<u8>,
    pub restrict: Option<Vec<String>>,
    pub outline_width: Option<usize>,
    pub outline_color: Option<String>,
    pub page_width: Option<f64>,
    pub page_height: Option<f64>,
    pub margin: Option<f64>,
    pub orientation: Option<Orientation>,
    pub max_legend_columns: Option<usize>,
}

/// A loaded configuration and the file it came from, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: BeadConfig,
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory relative paths in the config (palette files) resolve from.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

/// Find bead.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find bead.toml by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from `path`, or from a discovered bead.toml when
/// `path` is `None`. Falls back to defaults when nothing is found.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            tracing::info!(path = %p.display(), "loaded config");
            Ok(LoadedConfig { config, path: Some(p) })
        }
        None => {
            tracing::debug!("no bead.toml found; using defaults");
            Ok(LoadedConfig { config: default_config(), path: None })
        }
    }
}

/// Parse and validate a config string.
pub fn parse_config(contents: &str) -> Result<BeadConfig, ConfigError> {
    let config: BeadConfig = toml::from_str(contents)?;
    check(&config)?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<BeadConfig, ConfigError> {
    parse_config(&fs::read_to_string(path)?)
}

fn check(config: &BeadConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// The configuration used when no bead.toml exists.
pub fn default_config() -> BeadConfig {
    BeadConfig::default()
}

/// Apply CLI overrides to `config`. The result is validated again, since
/// flags can introduce values the file would have rejected.
pub fn merge_cli_overrides(
    config: &mut BeadConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    let pattern = &mut config.pattern;
    if let Some(palette) = &overrides.palette {
        pattern.palette = palette.clone();
    }
    if let Some(resolution) = overrides.resolution {
        pattern.resolution = resolution;
    }
    if let Some(partitions) = overrides.partitions {
        pattern.partitions = partitions;
    }
    if let Some(max_colors) = overrides.max_colors {
        pattern.max_colors = Some(max_colors);
    }
    if let Some(threshold) = overrides.merge_threshold {
        pattern.merge_threshold = threshold;
    }
    if let Some(alpha) = overrides.alpha_threshold {
        pattern.alpha_threshold = alpha;
    }
    if let Some(restrict) = &overrides.restrict {
        pattern.restrict = Some(restrict.clone());
    }

    if let Some(width) = overrides.outline_width {
        config.outline.width = width;
    }
    if let Some(color) = &overrides.outline_color {
        config.outline.color = color.clone();
    }

    let page = &mut config.page;
    if let Some(width) = overrides.page_width {
        page.width = width;
    }
    if let Some(height) = overrides.page_height {
        page.height = height;
    }
    if let Some(margin) = overrides.margin {
        page.margin = margin;
    }
    if let Some(orientation) = overrides.orientation {
        page.orientation = orientation;
    }
    if let Some(columns) = overrides.max_legend_columns {
        page.max_legend_columns = columns;
    }

    check(config)
}
