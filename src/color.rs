use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::MassKey;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// 8-bit sRGB triple, shared by the window and the image exporter.
pub type Rgb = [u8; 3];

const FALLBACK: Rgb = [128, 128, 128];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: mass group → colour
// ---------------------------------------------------------------------------

/// One colour per dark-matter mass, stable across panels.
#[derive(Debug, Clone, Default)]
pub struct MassColors {
    mapping: BTreeMap<MassKey, Rgb>,
}

impl MassColors {
    pub fn new<I: IntoIterator<Item = MassKey>>(masses: I) -> Self {
        let keys: Vec<MassKey> = masses.into_iter().collect();
        let mapping = keys
            .iter()
            .copied()
            .zip(generate_palette(keys.len()))
            .collect();
        MassColors { mapping }
    }

    pub fn color_for(&self, mass: MassKey) -> Rgb {
        self.mapping.get(&mass).copied().unwrap_or(FALLBACK)
    }
}
