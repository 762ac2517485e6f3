//! Fixed bead palettes and nearest-color lookup.
//!
//! A [`Palette`] is an ordered set of `(code, color)` entries. Iteration order
//! is the order the entries were supplied in, and every nearest-color search
//! breaks ties in favour of the earlier entry.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{DistanceMetric, Rgb};

/// Error type for palette construction and loading
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaletteError {
    /// A palette must contain at least one color
    #[error("palette '{0}' has no colors")]
    Empty(String),
    /// The same code appears twice
    #[error("palette '{name}' defines code '{code}' more than once")]
    DuplicateCode { name: String, code: String },
    /// File I/O error
    #[error("failed to read palette file: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error
    #[error("failed to parse palette JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML parsing error
    #[error("failed to parse palette TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// Neither a built-in palette nor an existing file
    #[error("unknown palette '{name}'{}", hint_suffix(.hint))]
    Unknown { name: String, hint: Option<String> },
}

/// `". Did you mean ...?"` when there is a hint.
pub(crate) fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!(". {h}")).unwrap_or_default()
}

/// One named palette color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteColor {
    /// Stable short code (catalog key)
    pub code: String,
    /// Canonical `#RRGGBB` hex
    pub hex: String,
    #[serde(skip)]
    pub rgb: Rgb,
}

/// On-disk palette description.
///
/// ```toml
/// name = "my-beads"
///
/// [[colors]]
/// code = "A1"
/// hex = "#FAF5CD"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteFile {
    pub name: String,
    #[serde(default)]
    pub metric: DistanceMetric,
    pub colors: Vec<PaletteFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteFileEntry {
    pub code: String,
    pub hex: String,
}

/// An ordered, immutable mapping from code to color.
#[derive(Debug, Clone)]
pub struct Palette {
    name: String,
    entries: Vec<PaletteColor>,
    index: HashMap<String, usize>,
    metric: DistanceMetric,
    /// Index of the darkest entry, returned when a search finds nothing.
    fallback: usize,
}

impl Palette {
    /// Build a palette from `(code, hex)` pairs, preserving their order.
    ///
    /// Malformed hex values degrade to black instead of failing.
    pub fn new<I, C, H>(name: impl Into<String>, colors: I) -> Result<Self, PaletteError>
    where
        I: IntoIterator<Item = (C, H)>,
        C: Into<String>,
        H: AsRef<str>,
    {
        let name = name.into();
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for (code, hex) in colors {
            let code = code.into();
            let rgb = match Rgb::from_hex(hex.as_ref()) {
                Ok(rgb) => rgb,
                Err(e) => {
                    tracing::warn!(palette = %name, %code, hex = hex.as_ref(), "{e}; using black");
                    Rgb::BLACK
                }
            };
            if index.insert(code.clone(), entries.len()).is_some() {
                return Err(PaletteError::DuplicateCode { name, code });
            }
            entries.push(PaletteColor { code, hex: rgb.to_hex(), rgb });
        }

        if entries.is_empty() {
            return Err(PaletteError::Empty(name));
        }

        let fallback = entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.rgb.luminance().total_cmp(&b.rgb.luminance()))
            .map(|(i, _)| i)
            .unwrap_or(0);

        Ok(Self { name, entries, index, metric: DistanceMetric::default(), fallback })
    }

    /// Use a different distance metric for all lookups.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Build a palette from its file description.
    pub fn from_file_contents(file: PaletteFile) -> Result<Self, PaletteError> {
        let metric = file.metric;
        let palette = Self::new(file.name, file.colors.into_iter().map(|e| (e.code, e.hex)))?;
        Ok(palette.with_metric(metric))
    }

    /// Load a palette from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self, PaletteError> {
        let contents = fs::read_to_string(path)?;
        let file: PaletteFile = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };
        Self::from_file_contents(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; construction rejects empty palettes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteColor> {
        self.entries.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.code.as_str())
    }

    pub fn get(&self, code: &str) -> Option<&PaletteColor> {
        self.index.get(code).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// The darkest entry, used when a search has no usable candidate.
    pub fn fallback(&self) -> &PaletteColor {
        &self.entries[self.fallback]
    }

    /// Distance between two colors under this palette's metric.
    pub fn distance(&self, a: Rgb, b: Rgb) -> f64 {
        self.metric.distance(a, b)
    }

    /// Find the palette entry closest to `color`.
    ///
    /// With `restrict`, only those codes are considered; unknown codes are
    /// skipped. If no candidate remains, the darkest palette entry is returned.
    ///
    /// ```
    /// use beadsheet::color::Rgb;
    /// use beadsheet::palette::Palette;
    ///
    /// let palette = Palette::new("bw", [("A", "#000000"), ("B", "#FFFFFF")]).unwrap();
    /// let nearest = palette.find_nearest_color(Rgb::from_hex_lossy("#101010"), None);
    /// assert_eq!(nearest.code, "A");
    /// ```
    pub fn find_nearest_color(&self, color: Rgb, restrict: Option<&[String]>) -> &PaletteColor {
        let best = match restrict {
            Some(codes) => self.nearest_of(color, codes.iter().filter_map(|c| self.get(c))),
            None => self.nearest_of(color, self.entries.iter()),
        };
        best.unwrap_or_else(|| self.fallback())
    }

    /// Find the entry in `codes` closest to the color of `source`, never
    /// returning `source` itself.
    ///
    /// Returns `None` when `source` is not in the palette or no other known
    /// code is available.
    pub fn find_nearest_in_palette(&self, source: &str, codes: &[String]) -> Option<&PaletteColor> {
        let origin = self.get(source)?;
        let candidates = codes.iter().filter(|c| c.as_str() != source).filter_map(|c| self.get(c));
        self.nearest_of(origin.rgb, candidates)
    }

    /// Linear scan keeping the first strictly-closer candidate.
    fn nearest_of<'a>(
        &self,
        color: Rgb,
        candidates: impl Iterator<Item = &'a PaletteColor>,
    ) -> Option<&'a PaletteColor> {
        let mut best = None;
        let mut best_distance = f64::INFINITY;
        for candidate in candidates {
            let d = self.metric.distance(color, candidate.rgb);
            if d < best_distance {
                best_distance = d;
                best = Some(candidate);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> Palette {
        Palette::new("bw", [("A", "#000000"), ("B", "#FFFFFF")]).unwrap()
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_preserves_order_and_canonical_hex() {
        let palette = Palette::new("p", [("Z", "ff0000"), ("A", "#00f")]).unwrap();
        let order: Vec<&str> = palette.codes().collect();
        assert_eq!(order, vec!["Z", "A"]);
        assert_eq!(palette.get("Z").unwrap().hex, "#FF0000");
        assert_eq!(palette.get("A").unwrap().hex, "#0000FF");
    }

    #[test]
    fn test_new_rejects_empty_and_duplicates() {
        let empty: [(&str, &str); 0] = [];
        assert!(matches!(Palette::new("e", empty), Err(PaletteError::Empty(_))));
        let dup = Palette::new("d", [("A", "#000000"), ("A", "#FFFFFF")]);
        assert!(matches!(dup, Err(PaletteError::DuplicateCode { .. })));
    }

    #[test]
    fn test_malformed_hex_degrades_to_black() {
        let palette = Palette::new("p", [("X", "oops"), ("W", "#FFFFFF")]).unwrap();
        assert_eq!(palette.get("X").unwrap().rgb, Rgb::BLACK);
        assert_eq!(palette.get("X").unwrap().hex, "#000000");
    }

    #[test]
    fn test_find_nearest_color_dark_gray() {
        let palette = bw();
        let found = palette.find_nearest_color(Rgb::new(0x10, 0x10, 0x10), None);
        assert_eq!(found.code, "A");
    }

    #[test]
    fn test_find_nearest_color_tie_keeps_first() {
        let palette = Palette::new("p", [("L", "#000000"), ("R", "#020202")]).unwrap();
        let found = palette.find_nearest_color(Rgb::new(1, 1, 1), None);
        assert_eq!(found.code, "L");
    }

    #[test]
    fn test_find_nearest_color_restricted() {
        let palette =
            Palette::new("p", [("K", "#000000"), ("G", "#808080"), ("W", "#FFFFFF")]).unwrap();
        let restrict = codes(&["K", "W"]);
        let found = palette.find_nearest_color(Rgb::new(120, 120, 120), Some(restrict.as_slice()));
        assert_eq!(found.code, "W");
    }

    #[test]
    fn test_find_nearest_color_unknown_candidates_fall_back_to_darkest() {
        let palette =
            Palette::new("p", [("W", "#FFFFFF"), ("G", "#808080"), ("K", "#050505")]).unwrap();
        let restrict = codes(&["nope", "missing"]);
        let found = palette.find_nearest_color(Rgb::WHITE, Some(restrict.as_slice()));
        assert_eq!(found.code, "K");
        let found = palette.find_nearest_color(Rgb::WHITE, Some(&[][..]));
        assert_eq!(found.code, "K");
    }

    #[test]
    fn test_find_nearest_in_palette_never_returns_source() {
        let palette =
            Palette::new("p", [("K", "#000000"), ("D", "#101010"), ("W", "#FFFFFF")]).unwrap();
        let found = palette.find_nearest_in_palette("K", &codes(&["K", "D", "W"]));
        assert_eq!(found.map(|c| c.code.as_str()), Some("D"));
    }

    #[test]
    fn test_find_nearest_in_palette_none_cases() {
        let palette = bw();
        assert!(palette.find_nearest_in_palette("A", &codes(&["A"])).is_none());
        assert!(palette.find_nearest_in_palette("missing", &codes(&["A", "B"])).is_none());
        assert!(palette.find_nearest_in_palette("A", &codes(&["missing"])).is_none());
    }

    #[test]
    fn test_fallback_is_darkest() {
        let palette =
            Palette::new("p", [("W", "#FFFFFF"), ("N", "#000080"), ("K", "#000000")]).unwrap();
        assert_eq!(palette.fallback().code, "K");
    }

    #[test]
    fn test_cie76_metric_changes_choice() {
        let palette = Palette::new("p", [("A", "#FF0000"), ("B", "#00FF00")])
            .unwrap()
            .with_metric(DistanceMetric::Cie76);
        assert_eq!(palette.metric(), DistanceMetric::Cie76);
        let found = palette.find_nearest_color(Rgb::new(250, 10, 10), None);
        assert_eq!(found.code, "A");
    }

    #[test]
    fn test_load_json_and_toml() {
        let dir = tempfile::TempDir::new().unwrap();

        let json_path = dir.path().join("p.json");
        fs::write(
            &json_path,
            r##"{"name":"j","colors":[
                {"code":"B","hex":"#FFFFFF"},
                {"code":"A","hex":"#000000"}
            ]}"##,
        )
        .unwrap();
        let palette = Palette::load(&json_path).unwrap();
        assert_eq!(palette.name(), "j");
        assert_eq!(palette.codes().collect::<Vec<_>>(), vec!["B", "A"]);

        let toml_path = dir.path().join("p.toml");
        fs::write(
            &toml_path,
            "name = \"t\"\nmetric = \"cie76\"\n\n[[colors]]\ncode = \"A1\"\nhex = \"#112233\"\n",
        )
        .unwrap();
        let palette = Palette::load(&toml_path).unwrap();
        assert_eq!(palette.name(), "t");
        assert_eq!(palette.metric(), DistanceMetric::Cie76);
        assert_eq!(palette.get("A1").unwrap().rgb, Rgb::new(0x11, 0x22, 0x33));
    }
}
