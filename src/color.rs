use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::OTHER_OPERATOR;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Operator → colour
// ---------------------------------------------------------------------------

/// Stable colour per operator name. "Other" is always grey so real operators
/// get the saturated hues.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(operators: &BTreeSet<String>) -> Self {
        let named: Vec<&String> = operators
            .iter()
            .filter(|op| op.as_str() != OTHER_OPERATOR)
            .collect();
        let mut mapping: BTreeMap<String, Color32> = named
            .iter()
            .zip(generate_palette(named.len()))
            .map(|(op, c)| ((*op).clone(), c))
            .collect();
        if operators.contains(OTHER_OPERATOR) {
            mapping.insert(OTHER_OPERATOR.to_string(), Color32::GRAY);
        }

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, operator: &str) -> Color32 {
        self.mapping
            .get(operator)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (operator → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(op, c)| (op.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
    }

    #[test]
    fn other_is_grey_and_named_operators_are_distinct() {
        let ops: BTreeSet<String> = ["MTN", "Glo", "Other"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new(&ops);
        assert_eq!(map.color_for("Other"), Color32::GRAY);
        assert_ne!(map.color_for("MTN"), map.color_for("Glo"));
        assert_eq!(map.color_for("Unlisted"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 3);
    }
}
