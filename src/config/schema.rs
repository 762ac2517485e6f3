//! Configuration schema types for `bead.toml`
//!
//! Every section and field is optional; missing values take the defaults
//! below.

use serde::{Deserialize, Serialize};

use crate::layout::{Orientation, PageSpec, DEFAULT_MAX_COLUMNS};
use crate::pipeline::{OutlineOptions, PatternOptions, MAX_GRID_SIZE};
use crate::quantize::DEFAULT_ALPHA_THRESHOLD;

/// Pattern building settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Built-in palette name or path to a palette file
    pub palette: String,
    /// Cells per sheet side
    pub resolution: usize,
    /// Sheets per side
    pub partitions: usize,
    /// Color budget; unlimited when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_colors: Option<usize>,
    /// Colors used fewer times are merged into common ones (0 = off)
    pub merge_threshold: usize,
    /// Alpha below this is transparent
    pub alpha_threshold: u8,
    /// Quantize against these codes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict: Option<Vec<String>>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            palette: "basic".to_string(),
            resolution: 29,
            partitions: 1,
            max_colors: None,
            merge_threshold: 0,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            restrict: None,
        }
    }
}

/// Outline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Rings to add around the design (0 = none)
    pub width: usize,
    /// Palette code of the outline color
    pub color: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self { width: 0, color: "H7".to_string() }
    }
}

/// Output page settings, in output pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub orientation: Orientation,
    pub max_legend_columns: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        let page = PageSpec::default();
        Self {
            width: page.width,
            height: page.height,
            margin: page.margin,
            orientation: page.orientation,
            max_legend_columns: DEFAULT_MAX_COLUMNS,
        }
    }
}

impl PageConfig {
    pub fn to_page_spec(&self) -> PageSpec {
        PageSpec {
            width: self.width,
            height: self.height,
            margin: self.margin,
            orientation: self.orientation,
            max_legend_columns: self.max_legend_columns,
        }
    }
}

/// Root configuration structure for bead.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeadConfig {
    pub pattern: PatternConfig,
    pub outline: OutlineConfig,
    pub page: PageConfig,
}

/// A single config validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Dotted path to the invalid field (e.g., "page.margin")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bead.toml: '{}' {}", self.field, self.message)
    }
}

impl BeadConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        if self.pattern.palette.trim().is_empty() {
            fail("pattern.palette", "must be a palette name or path");
        }
        if self.pattern.resolution == 0 {
            fail("pattern.resolution", "must be a positive integer");
        }
        if self.pattern.partitions == 0 {
            fail("pattern.partitions", "must be a positive integer");
        }
        let size = self.pattern.resolution.checked_mul(self.pattern.partitions);
        if size.map_or(true, |size| size > MAX_GRID_SIZE) {
            fail(
                "pattern.resolution",
                &format!("times pattern.partitions must be at most {MAX_GRID_SIZE}"),
            );
        }
        if self.pattern.max_colors == Some(0) {
            fail("pattern.max_colors", "must be a positive integer");
        }
        if self.pattern.restrict.as_ref().is_some_and(Vec::is_empty) {
            fail("pattern.restrict", "must list at least one code");
        }

        if self.outline.width > 0 && self.outline.color.trim().is_empty() {
            fail("outline.color", "must be a palette code");
        }

        let page = &self.page;
        if page.width.is_nan() || page.width <= 0.0 {
            fail("page.width", "must be positive");
        }
        if page.height.is_nan() || page.height <= 0.0 {
            fail("page.height", "must be positive");
        }
        if page.margin.is_nan() || page.margin < 0.0 {
            fail("page.margin", "must not be negative");
        } else if page.margin * 2.0 >= page.width.min(page.height) {
            fail("page.margin", "leaves no room on the page");
        }
        if page.max_legend_columns == 0 {
            fail("page.max_legend_columns", "must be a positive integer");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Pattern options described by this configuration.
    pub fn pattern_options(&self) -> PatternOptions {
        let outline = (self.outline.width > 0).then(|| OutlineOptions {
            width: self.outline.width,
            code: self.outline.color.clone(),
        });
        PatternOptions {
            resolution: self.pattern.resolution,
            partitions: self.pattern.partitions,
            max_colors: self.pattern.max_colors,
            merge_threshold: self.pattern.merge_threshold,
            alpha_threshold: self.pattern.alpha_threshold,
            outline,
            restrict: self.pattern.restrict.clone(),
            crop: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: BeadConfig = toml::from_str("").unwrap();
        assert_eq!(config, BeadConfig::default());
        assert_eq!(config.pattern.palette, "basic");
        assert_eq!(config.pattern.resolution, 29);
        assert_eq!(config.outline.color, "H7");
        assert_eq!(config.page.width, 2480.0);
        assert_eq!(config.page.orientation, Orientation::Tall);
        assert!(config.is_valid());
    }

    #[test]
    fn test_partial_sections() {
        let config: BeadConfig = toml::from_str(
            r#"
            [pattern]
            resolution = 40
            max_colors = 12

            [page]
            orientation = "wide"
            "#,
        )
        .unwrap();
        assert_eq!(config.pattern.resolution, 40);
        assert_eq!(config.pattern.max_colors, Some(12));
        assert_eq!(config.pattern.partitions, 1);
        assert_eq!(config.page.orientation, Orientation::Wide);
        assert_eq!(config.page.margin, 80.0);
    }

    #[test]
    fn test_integer_page_sizes_accepted() {
        let config: BeadConfig = toml::from_str("[page]\nwidth = 1000\nmargin = 40.5\n").unwrap();
        assert_eq!(config.page.width, 1000.0);
        assert_eq!(config.page.margin, 40.5);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = BeadConfig::default();
        config.pattern.resolution = 0;
        config.pattern.partitions = 0;
        config.pattern.max_colors = Some(0);
        config.page.margin = 2000.0;
        config.page.max_legend_columns = 0;
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "pattern.resolution",
                "pattern.partitions",
                "pattern.max_colors",
                "page.margin",
                "page.max_legend_columns",
            ]
        );
    }

    #[test]
    fn test_validate_limits_grid_size() {
        let mut config = BeadConfig::default();
        config.pattern.resolution = MAX_GRID_SIZE / 4;
        config.pattern.partitions = 4;
        assert!(config.is_valid());

        config.pattern.resolution = 65535;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "pattern.resolution");
        assert!(errors[0].message.contains(&MAX_GRID_SIZE.to_string()));

        config.pattern.resolution = usize::MAX;
        config.pattern.partitions = 2;
        assert!(!config.is_valid());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "page.width".into(),
            message: "must be positive".into(),
        };
        assert_eq!(err.to_string(), "bead.toml: 'page.width' must be positive");
    }

    #[test]
    fn test_pattern_options_outline_only_when_width_set() {
        let mut config = BeadConfig::default();
        assert!(config.pattern_options().outline.is_none());
        config.outline.width = 2;
        let options = config.pattern_options();
        assert_eq!(options.outline, Some(OutlineOptions { width: 2, code: "H7".into() }));
        assert_eq!(options.resolution, 29);
    }

    #[test]
    fn test_page_spec_conversion() {
        let config = BeadConfig::default();
        assert_eq!(config.page.to_page_spec(), PageSpec::default());
    }
}
