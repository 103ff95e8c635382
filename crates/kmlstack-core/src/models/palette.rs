use serde::{Deserialize, Serialize};

/// A named marker color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerColor {
    /// Human-readable name, also used as the style id in merged documents
    pub name: String,

    /// Web hex value, `#RRGGBB`
    pub hex: String,
}

impl MarkerColor {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }

    /// KML color encoding: lowercase `aabbggrr`, fully opaque. KML reverses
    /// the byte order of web hex colors, so `#FF0000` becomes `ff0000ff`.
    pub fn kml_color(&self) -> String {
        let rgb = self.hex.trim_start_matches('#');
        if rgb.len() != 6 || !rgb.bytes().all(|b| b.is_ascii_hexdigit()) {
            return "ffffffff".to_string();
        }
        format!("ff{}{}{}", &rgb[4..6], &rgb[2..4], &rgb[0..2]).to_lowercase()
    }
}

/// The fixed palette a merge session draws from, in assignment order.
///
/// Immutable for the lifetime of a session; color assignment is positional,
/// so it is a pure function of selection order and this palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorPalette {
    colors: Vec<MarkerColor>,
}

impl Default for ColorPalette {
    /// The standard ten-color palette, sized for the ten-file session cap.
    fn default() -> Self {
        Self::new(vec![
            MarkerColor::new("red", "#FF0000"),
            MarkerColor::new("blue", "#0000FF"),
            MarkerColor::new("yellow", "#FFFF00"),
            MarkerColor::new("green", "#00FF00"),
            MarkerColor::new("orange", "#FFA500"),
            MarkerColor::new("violet", "#EE82EE"),
            MarkerColor::new("pink", "#FFC0CB"),
            MarkerColor::new("purple", "#800080"),
            MarkerColor::new("turquoise", "#40E0D0"),
            MarkerColor::new("cyan", "#00FFFF"),
        ])
    }
}

impl ColorPalette {
    pub fn new(colors: Vec<MarkerColor>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for the given selection position, if the palette covers it.
    pub fn assign(&self, position: usize) -> Option<&MarkerColor> {
        self.colors.get(position)
    }

    pub fn colors(&self) -> &[MarkerColor] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_palette_has_ten_distinct_colors() {
        let palette = ColorPalette::default();
        assert_eq!(palette.len(), 10);

        let hexes: HashSet<&str> = palette.colors().iter().map(|c| c.hex.as_str()).collect();
        assert_eq!(hexes.len(), 10);

        let names: HashSet<&str> = palette.colors().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_positional_assignment() {
        let palette = ColorPalette::default();
        assert_eq!(palette.assign(0).map(|c| c.name.as_str()), Some("red"));
        assert_eq!(palette.assign(1).map(|c| c.name.as_str()), Some("blue"));
        assert_eq!(palette.assign(9).map(|c| c.name.as_str()), Some("cyan"));
        assert!(palette.assign(10).is_none());
    }

    #[test]
    fn test_kml_color_reverses_byte_order() {
        assert_eq!(MarkerColor::new("red", "#FF0000").kml_color(), "ff0000ff");
        assert_eq!(MarkerColor::new("blue", "#0000FF").kml_color(), "ffff0000");
        assert_eq!(MarkerColor::new("orange", "#FFA500").kml_color(), "ff00a5ff");
        assert_eq!(MarkerColor::new("turquoise", "#40E0D0").kml_color(), "ffd0e040");
    }

    #[test]
    fn test_kml_color_falls_back_on_malformed_hex() {
        assert_eq!(MarkerColor::new("odd", "#F00").kml_color(), "ffffffff");
        assert_eq!(MarkerColor::new("odd", "not-hex").kml_color(), "ffffffff");
    }
}
