use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use ideal_fit::SelectionResult;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
            let [r, g, b] = [rgb.red, rgb.green, rgb.blue].map(|c| (c * 255.0) as u8);
            Color32::from_rgb(r, g, b)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: ideal function id → Color32
// ---------------------------------------------------------------------------

/// One colour per selected ideal function, shared by both plots and the table.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Colour = position of the ideal function in selection order.
    pub fn for_selection(selection: &SelectionResult) -> Self {
        let mut order: Vec<String> = Vec::new();
        for pair in selection.pairs() {
            if !order.contains(&pair.candidate) {
                order.push(pair.candidate.clone());
            }
        }
        let palette = generate_palette(order.len());
        ColorMap {
            mapping: order.into_iter().zip(palette).collect(),
        }
    }

    /// Colour of an ideal function; gray when it was not selected.
    pub fn color_for(&self, ideal: &str) -> Color32 {
        self.mapping.get(ideal).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideal_fit::{Catalog, Series, TrainingSet};

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn shared_candidates_get_one_colour() {
        let x = vec![0.0, 1.0];
        let training: TrainingSet = [
            ("y1", Series::new(x.clone(), vec![0.0, 1.0])),
            ("y2", Series::new(x.clone(), vec![0.0, 1.1])),
        ]
        .into_iter()
        .collect();
        let catalog: Catalog = [("y9", Series::new(x, vec![0.0, 1.0]))].into_iter().collect();
        let selection = ideal_fit::select_best_matches(&training, &catalog).unwrap();

        let map = ColorMap::for_selection(&selection);
        assert_eq!(selection.shared_candidates(), vec!["y9"]);
        assert_ne!(map.color_for("y9"), Color32::GRAY);
        assert_eq!(map.color_for("y1"), Color32::GRAY);
    }
}
