use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Hue of the first category (blue).
const FIRST_HUE: f32 = 210.0;

/// `n` category colours on evenly spaced hues. Lightness alternates so that
/// neighbouring bars stay apart when there are many categories.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    let step = 360.0 / n.max(1) as f32;
    (0..n)
        .map(|i| {
            let lightness = if i % 2 == 0 { 0.50 } else { 0.62 };
            let hsl = Hsl::new(FIRST_HUE + i as f32 * step, 0.7, lightness);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Blue (−1) → white (0) → red (+1) scale for correlation coefficients.
/// Undefined coefficients are grey.
pub fn diverging(r: Option<f64>) -> Color32 {
    let Some(r) = r else {
        return Color32::GRAY;
    };
    let blue = LinSrgb::new(0.02, 0.15, 0.42);
    let white = LinSrgb::new(0.97, 0.97, 0.97);
    let red = LinSrgb::new(0.45, 0.01, 0.03);

    let r = r.clamp(-1.0, 1.0) as f32;
    let mixed = if r < 0.0 {
        white.mix(blue, -r)
    } else {
        white.mix(red, r)
    };
    to_color32(mixed.into_color())
}

/// Text colour readable on top of [`diverging`] backgrounds.
pub fn diverging_text(r: Option<f64>) -> Color32 {
    match r {
        Some(r) if r.abs() > 0.6 => Color32::WHITE,
        _ => Color32::BLACK,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical field to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the distinct labels; duplicates are ignored.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut unique: Vec<&str> = Vec::new();
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        unique.sort_unstable();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
