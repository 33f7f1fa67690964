//! Sizing of the vote count and label shown inside the ring.

use crate::render::{Font, TextMeasure};

const SEARCH_STEPS: i32 = 10;
/// Accepted deviation on either side of the target width.
const TOLERANCE: f64 = 0.4;

/// Font sizes that fit the center info into a square of `box_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterTextSizes {
    pub box_size: f64,
    /// Bold label ("RÖSTER") size.
    pub label_size: f64,
    /// Vote count size.
    pub number_size: f64,
}

/// Binary-searches the label size, capped at half of `box_size`, then gives
/// the vote count at most the remaining height. Both searches stop after ten
/// halvings or once the measured width is within tolerance of `box_size`.
#[must_use]
pub fn fit_center_text(
    measure: &impl TextMeasure,
    label: &str,
    number: &str,
    box_size: f64,
) -> CenterTextSizes {
    let mut label_size = box_size;
    for step in 0..SEARCH_STEPS {
        let width = measure.measure_text(label, Font::bold(label_size));
        let delta = box_size / 2_f64.powi(step + 1);
        if label_size > box_size * 0.5 + TOLERANCE || width > box_size + TOLERANCE {
            label_size -= delta;
        } else if width < box_size - TOLERANCE {
            label_size += delta;
        } else {
            break;
        }
    }

    let number_cap = box_size - label_size;
    let mut number_size = number_cap;
    for step in 0..SEARCH_STEPS {
        let width = measure.measure_text(number, Font::regular(number_size));
        let delta = box_size / 2_f64.powi(step + 1);
        if number_size > number_cap + TOLERANCE || width > box_size + TOLERANCE {
            number_size -= delta;
        } else if width < box_size - TOLERANCE {
            number_size += delta;
        } else {
            break;
        }
    }

    CenterTextSizes {
        box_size,
        label_size,
        number_size,
    }
}

#[cfg(test)]
mod tests {
    use super::fit_center_text;
    use crate::render::{Font, TextMeasure};

    /// Glyphs are as wide as the font size.
    struct Square;

    impl TextMeasure for Square {
        fn measure_text(&self, text: &str, font: Font) -> f64 {
            text.chars().count() as f64 * font.size_px
        }
    }

    #[test]
    fn long_label_shrinks_until_it_fits() {
        let sizes = fit_center_text(&Square, "RÖSTER", "742", 120.0);
        let width = Square.measure_text("RÖSTER", Font::bold(sizes.label_size));
        assert!(width <= 120.0 + 0.4, "label width {width}");
        assert!(sizes.label_size > 15.0);
    }

    #[test]
    fn label_never_exceeds_half_the_box() {
        let sizes = fit_center_text(&Square, "A", "1", 100.0);
        // the search settles within one final halving of the cap
        assert!(sizes.label_size <= 51.0, "label size {}", sizes.label_size);
        assert!(sizes.label_size + sizes.number_size <= 101.0);
    }

    #[test]
    fn both_lines_stay_inside_the_box_height() {
        let sizes = fit_center_text(&Square, "VOTES", "12", 96.0);
        assert!(sizes.label_size + sizes.number_size <= 96.0 + 0.8);
        assert_eq!(sizes.box_size, 96.0);
    }
}
