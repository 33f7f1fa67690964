//! Fitting strings into a pixel width.

use crate::render::{Font, TextMeasure};

const ELLIPSIS: &str = "...";

/// Cuts `text` so it fits `max_width`, ending in `...` where characters were
/// dropped. The first character is always kept, even when it alone overflows.
#[must_use]
pub fn contract_text(measure: &impl TextMeasure, text: &str, font: Font, max_width: f64) -> String {
    let mut output = String::with_capacity(text.len());
    for character in text.chars() {
        let candidate = format!("{output}{character}{ELLIPSIS}");
        if !output.is_empty() && measure.measure_text(&candidate, font) > max_width {
            output.push_str(ELLIPSIS);
            return output;
        }
        output.push(character);
    }
    output
}

/// Breaks `text` on spaces into lines no wider than `max_width`.
///
/// A single word wider than the limit gets a line of its own. With
/// `max_rows`, words past the last allowed row are dropped.
#[must_use]
pub fn wrap_text(
    measure: &impl TextMeasure,
    text: &str,
    font: Font,
    max_width: f64,
    max_rows: Option<usize>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };

        if !current.is_empty() && measure.measure_text(&candidate, font) > max_width {
            lines.push(std::mem::take(&mut current));
            if max_rows.is_some_and(|rows| lines.len() >= rows) {
                return lines;
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }

    if max_rows.is_none_or(|rows| lines.len() < rows) {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::{contract_text, wrap_text};
    use crate::render::{Font, TextMeasure};

    /// Every character is 10 px wide.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn measure_text(&self, text: &str, _font: Font) -> f64 {
            text.chars().count() as f64 * 10.0
        }
    }

    const FONT: Font = Font::regular(12.0);

    #[test]
    fn contract_keeps_short_text_untouched() {
        assert_eq!(contract_text(&Monospace, "abc", FONT, 30.0), "abc");
    }

    #[test]
    fn contract_appends_ellipsis_when_cut() {
        assert_eq!(contract_text(&Monospace, "abcdefgh", FONT, 60.0), "abc...");
        assert_eq!(contract_text(&Monospace, "abcdefgh", FONT, 5.0), "a...");
    }

    #[test]
    fn wrap_breaks_on_spaces() {
        let lines = wrap_text(&Monospace, "aa bb cc dd", FONT, 50.0, None);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn wrap_honours_row_limit() {
        let lines = wrap_text(&Monospace, "aa bb cc dd ee", FONT, 20.0, Some(2));
        assert_eq!(lines, vec!["aa", "bb"]);
    }
}
