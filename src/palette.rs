//! Deterministic categorical color palettes.
//!
//! Category `i` in an ordered label sequence receives hue `i * 137.5°`
//! (the golden angle), which keeps neighbouring categories visually apart.
//! The mapping depends only on the order of the labels, so the same
//! first-appearance order always yields the same colors on every chart and
//! map layer of a render pass.

use crate::constants::{GOLDEN_ANGLE_DEGREES, PALETTE_ALPHA, PALETTE_AMPLITUDE, PALETTE_BASE};
use crate::models::Rgba;
use serde::Serialize;
use std::collections::HashMap;

/// Ordered category to color mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorPalette {
    entries: Vec<(String, Rgba)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ColorPalette {
    /// Color assigned to `label`, if it is part of the palette
    pub fn get(&self, label: &str) -> Option<Rgba> {
        self.index.get(label).map(|&i| self.entries[i].1)
    }

    /// Color for an optional label, falling back to neutral gray
    pub fn color_for(&self, label: Option<&str>) -> Rgba {
        label.and_then(|l| self.get(l)).unwrap_or(Rgba::NEUTRAL)
    }

    /// Labels and colors in palette order
    pub fn entries(&self) -> &[(String, Rgba)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Color of the category at position `position` in palette order
pub fn palette_color(position: usize) -> Rgba {
    let hue = (position as f64 * GOLDEN_ANGLE_DEGREES) % 360.0;
    Rgba::new(
        channel(hue),
        channel(hue + 120.0),
        channel(hue + 240.0),
        PALETTE_ALPHA,
    )
}

fn channel(degrees: f64) -> u8 {
    let value = 255.0 * (PALETTE_BASE + PALETTE_AMPLITUDE * degrees.to_radians().sin());
    value.round().clamp(0.0, 255.0) as u8
}

/// Assign a color to each distinct label, in the order given
///
/// Repeated labels keep the color of their first occurrence and do not
/// consume a palette position. An empty input yields an empty palette.
pub fn generate_palette<I, S>(labels: I) -> ColorPalette
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut palette = ColorPalette::default();

    for label in labels {
        let label = label.as_ref();
        if palette.index.contains_key(label) {
            continue;
        }
        let color = palette_color(palette.entries.len());
        palette.index.insert(label.to_string(), palette.entries.len());
        palette.entries.push((label.to_string(), color));
    }

    palette
}
