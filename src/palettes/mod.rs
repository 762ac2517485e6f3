//! Built-in bead palettes.
//!
//! Provides palettes that can be selected by name instead of loading a
//! palette file.

use std::path::Path;

use crate::palette::{Palette, PaletteError};
use crate::suggest::did_you_mean;

/// List of all available built-in palette names.
const BUILTIN_NAMES: &[&str] = &["basic", "grayscale"];

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

/// Returns a built-in palette by name, or None if not found.
pub fn get_builtin(name: &str) -> Option<Palette> {
    let colors: &[(&str, &str)] = match name {
        "basic" => BASIC,
        "grayscale" => GRAYSCALE,
        _ => return None,
    };
    Palette::new(name, colors.iter().copied()).ok()
}

/// Resolve a palette by built-in name, or else as a file path.
///
/// Relative paths are taken from `base_dir` when given.
pub fn resolve_palette(
    name_or_path: &str,
    base_dir: Option<&Path>,
) -> Result<Palette, PaletteError> {
    if let Some(palette) = get_builtin(name_or_path) {
        return Ok(palette);
    }

    let path = match base_dir {
        Some(base) if Path::new(name_or_path).is_relative() => base.join(name_or_path),
        _ => Path::new(name_or_path).to_path_buf(),
    };
    if path.is_file() {
        tracing::debug!(path = %path.display(), "loading palette file");
        return Palette::load(&path);
    }

    Err(PaletteError::Unknown {
        name: name_or_path.to_string(),
        hint: did_you_mean(name_or_path, BUILTIN_NAMES.iter().copied()),
    })
}

/// 24 general-purpose bead colors grouped by hue family.
/// H7 is black and doubles as the default outline color.
const BASIC: &[(&str, &str)] = &[
    ("A1", "#FAF5CD"),
    ("A4", "#F9E04B"),
    ("A6", "#F5A623"),
    ("B3", "#9EDB6A"),
    ("B5", "#3FAE49"),
    ("B8", "#1F6B3A"),
    ("C2", "#A8DDF0"),
    ("C6", "#3C8DD0"),
    ("C8", "#1F3F8F"),
    ("D3", "#B79BD8"),
    ("D6", "#7448A8"),
    ("E2", "#F7C2D4"),
    ("E4", "#EE6FA0"),
    ("F3", "#F1574C"),
    ("F5", "#C81E2B"),
    ("F8", "#7A1420"),
    ("G1", "#F6D3B3"),
    ("G5", "#C28452"),
    ("G7", "#7A4A2A"),
    ("H1", "#FFFFFF"),
    ("H3", "#C8C8C8"),
    ("H4", "#8C8C8C"),
    ("H5", "#505050"),
    ("H7", "#000000"),
];

/// 8-shade grayscale palette from white to black.
const GRAYSCALE: &[(&str, &str)] = &[
    ("G0", "#FFFFFF"),
    ("G1", "#DFDFDF"),
    ("G2", "#BFBFBF"),
    ("G3", "#9F9F9F"),
    ("G4", "#7F7F7F"),
    ("G5", "#5F5F5F"),
    ("G6", "#3F3F3F"),
    ("G7", "#000000"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_builtins() {
        let builtins = list_builtins();
        assert!(builtins.contains(&"basic"));
        assert!(builtins.contains(&"grayscale"));
        assert_eq!(builtins.len(), 2);
    }

    #[test]
    fn test_get_builtin_basic() {
        let palette = get_builtin("basic").expect("basic palette should exist");
        assert_eq!(palette.name(), "basic");
        assert_eq!(palette.len(), 24);
        assert_eq!(palette.get("H7").map(|c| c.hex.as_str()), Some("#000000"));
        assert_eq!(palette.fallback().code, "H7");
    }

    #[test]
    fn test_get_builtin_grayscale() {
        let palette = get_builtin("grayscale").expect("grayscale palette should exist");
        assert_eq!(palette.len(), 8);
        assert_eq!(palette.codes().next(), Some("G0"));
    }

    #[test]
    fn test_get_builtin_nonexistent() {
        assert!(get_builtin("nonexistent").is_none());
        assert!(get_builtin("").is_none());
        assert!(get_builtin("Basic").is_none()); // case-sensitive
    }

    #[test]
    fn test_resolve_palette_prefers_builtin() {
        let palette = resolve_palette("grayscale", None).unwrap();
        assert_eq!(palette.name(), "grayscale");
    }

    #[test]
    fn test_resolve_palette_from_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mine.toml"),
            "name = \"mine\"\n[[colors]]\ncode = \"X\"\nhex = \"#123456\"\n",
        )
        .unwrap();
        let palette = resolve_palette("mine.toml", Some(dir.path())).unwrap();
        assert_eq!(palette.name(), "mine");
        assert_eq!(palette.get("X").map(|c| c.hex.as_str()), Some("#123456"));
    }

    #[test]
    fn test_resolve_palette_unknown_suggests() {
        let err = resolve_palette("greyscale", None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown palette 'greyscale'"), "{message}");
        assert!(message.contains("Did you mean 'grayscale'?"), "{message}");
    }
}
