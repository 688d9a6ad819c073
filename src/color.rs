use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CategoryColumn;

/// Colour of every point when nothing is highlighted or coloured by category.
pub const DEFAULT_POINT: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
/// Colour of the highlighted fund.
pub const HIGHLIGHT_POINT: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
/// Colour of the other funds while one is highlighted (CSS `lightgrey`).
pub const MUTED_POINT: Color32 = Color32::from_rgb(0xd3, 0xd3, 0xd3);

/// `#rrggbb` form of a colour, as used in exported chart specs.
pub fn to_hex(c: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b())
}

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
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: CategoryColumn,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    pub fn new(column: CategoryColumn, unique_values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values.iter().cloned().zip(palette).collect();

        ColorMap {
            column,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category value; nulls and unknown values
    /// get the default grey.
    pub fn color_for(&self, value: Option<&str>) -> Color32 {
        value
            .and_then(|v| self.mapping.get(v))
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(v, c)| (v.clone(), *c)).collect()
    }
}
