use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

/// An 8-bit sRGB triple, shared by the PNG renderer and the viewer.
pub type Rgb8 = [u8; 3];

const GRAY: Rgb8 = [160, 160, 160];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: series label → colour
// ---------------------------------------------------------------------------

/// Maps series labels (e.g. "drinks", "food") to distinct colours, in the
/// order the labels were given.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Rgb8>,
    order: Vec<String>,
}

impl ColorMap {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let palette = generate_palette(labels.len());
        let order: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        let mapping = order.iter().cloned().zip(palette).collect();
        ColorMap { mapping, order }
    }

    /// Look up the colour for a label; unknown labels are gray.
    pub fn color_for(&self, label: &str) -> Rgb8 {
        self.mapping.get(label).copied().unwrap_or(GRAY)
    }

    /// Legend entries (label → colour) in insertion order.
    pub fn legend_entries(&self) -> Vec<(String, Rgb8)> {
        self.order
            .iter()
            .map(|l| (l.clone(), self.color_for(l)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        for i in 0..colours.len() {
            for j in (i + 1)..colours.len() {
                assert_ne!(colours[i], colours[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn color_map_keeps_label_order() {
        let map = ColorMap::new(&["drinks", "food"]);
        let legend = map.legend_entries();
        assert_eq!(legend[0].0, "drinks");
        assert_eq!(legend[1].0, "food");
        assert_eq!(map.color_for("unknown"), GRAY);
    }
}
