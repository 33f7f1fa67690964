use tracing::warn;

use crate::core::DataSet;
use crate::render::Color;

/// Built-in dark-to-light blue/green gradient.
pub const DEFAULT_COLOR_SCHEME: [Color; 12] = [
    Color::from_rgb8(0x10, 0x18, 0x46),
    Color::from_rgb8(0x14, 0x22, 0x62),
    Color::from_rgb8(0x1C, 0x2B, 0x80),
    Color::from_rgb8(0x21, 0x46, 0x8D),
    Color::from_rgb8(0x30, 0x5E, 0x9B),
    Color::from_rgb8(0x38, 0x77, 0xAD),
    Color::from_rgb8(0x3E, 0x90, 0xC0),
    Color::from_rgb8(0x46, 0xAA, 0xCE),
    Color::from_rgb8(0x65, 0xBA, 0xDF),
    Color::from_rgb8(0x89, 0xCD, 0xD0),
    Color::from_rgb8(0xB1, 0xDE, 0xCD),
    Color::from_rgb8(0xDC, 0xEB, 0xCB),
];

/// Palette index picked for entry `index` out of `entries`.
///
/// Samples evenly while skipping both ends of the gradient:
/// `floor((index + 1) * palette_len / (entries + 1))`.
#[must_use]
pub fn palette_index(index: usize, entries: usize, palette_len: usize) -> usize {
    ((index + 1) * palette_len) / (entries + 1)
}

/// One color per entry, in data set order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorAssignment {
    colors: Vec<Color>,
}

impl ColorAssignment {
    /// Subsamples `palette` for every entry of `data`.
    ///
    /// A palette shorter than the data set still works (colors repeat) and an
    /// empty one falls back to the neutral color; both are only logged.
    #[must_use]
    pub fn from_palette(data: &DataSet, palette: &[Color]) -> Self {
        let entries = data.len();
        if palette.is_empty() {
            warn!(entries, "color scheme is empty, using the neutral color for every entry");
            return Self {
                colors: vec![Color::NEUTRAL; entries],
            };
        }
        if palette.len() < entries {
            warn!(
                colors = palette.len(),
                entries,
                "color scheme has fewer colors than data entries, entries may look alike"
            );
        }

        let colors = (0..entries)
            .map(|index| palette[palette_index(index, entries, palette.len())])
            .collect();
        Self { colors }
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Color of entry `index`; neutral for out-of-range indices.
    #[must_use]
    pub fn color(&self, index: usize) -> Color {
        self.colors.get(index).copied().unwrap_or(Color::NEUTRAL)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorAssignment, DEFAULT_COLOR_SCHEME, palette_index};
    use crate::core::{DataSet, Entry, SortMode};
    use crate::render::Color;

    fn data(count: usize) -> DataSet {
        DataSet::from_entries(
            (0..count).map(|index| Entry::new(format!("option {index}"), index as u64)),
            SortMode::None,
        )
    }

    #[test]
    fn five_entries_skip_both_palette_ends() {
        let indices: Vec<usize> = (0..5).map(|index| palette_index(index, 5, 12)).collect();
        assert_eq!(indices, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn assignment_follows_default_gradient() {
        let colors = ColorAssignment::from_palette(&data(5), &DEFAULT_COLOR_SCHEME);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors.color(0), DEFAULT_COLOR_SCHEME[2]);
        assert_eq!(colors.color(4), DEFAULT_COLOR_SCHEME[10]);
    }

    #[test]
    fn short_palette_repeats_colors() {
        let palette = [Color::WHITE, Color::ink(1.0)];
        let colors = ColorAssignment::from_palette(&data(4), &palette);
        assert_eq!(colors.len(), 4);
        assert_eq!(colors.color(0), Color::WHITE);
        assert_eq!(colors.color(3), Color::ink(1.0));
    }

    #[test]
    fn empty_palette_falls_back_to_neutral() {
        let colors = ColorAssignment::from_palette(&data(3), &[]);
        assert_eq!(colors.colors(), &[Color::NEUTRAL; 3]);
    }
}
