use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_COLOR_SCHEME, SortMode};
use crate::error::ChartResult;
use crate::render::Color;

/// Construction options shared by every chart variant.
///
/// Serializable so hosts can keep chart setup next to their vote data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Word shown after vote counts, e.g. "742 Röster".
    #[serde(default = "default_votes_label")]
    pub votes_label: String,
    /// Entry ordering; `None` uses the variant's default.
    #[serde(default)]
    pub sort: Option<SortMode>,
    /// Gradient sampled for entry colors; `None` uses the built-in scheme.
    #[serde(default)]
    pub color_scheme: Option<Vec<Color>>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            votes_label: default_votes_label(),
            sort: None,
            color_scheme: None,
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn with_votes_label(mut self, votes_label: impl Into<String>) -> Self {
        self.votes_label = votes_label.into();
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_color_scheme(mut self, colors: Vec<Color>) -> Self {
        self.color_scheme = Some(colors);
        self
    }

    /// Parses a scheme of hex strings such as `["#101846", "#DCEBCB"]`.
    pub fn with_hex_color_scheme<'a>(
        self,
        colors: impl IntoIterator<Item = &'a str>,
    ) -> ChartResult<Self> {
        let colors = colors
            .into_iter()
            .map(Color::from_hex)
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(self.with_color_scheme(colors))
    }

    /// Colors to sample from, falling back to the built-in gradient.
    #[must_use]
    pub fn palette(&self) -> &[Color] {
        self.color_scheme.as_deref().unwrap_or(&DEFAULT_COLOR_SCHEME)
    }
}

fn default_votes_label() -> String {
    "Röster".to_owned()
}

#[cfg(test)]
mod tests {
    use super::ChartOptions;
    use crate::core::{DEFAULT_COLOR_SCHEME, SortMode};

    #[test]
    fn missing_fields_take_defaults() {
        let options: ChartOptions = serde_json::from_str(r#"{"sort":"DESC"}"#).expect("parse");
        assert_eq!(options.votes_label, "Röster");
        assert_eq!(options.sort, Some(SortMode::Desc));
        assert_eq!(options.palette(), &DEFAULT_COLOR_SCHEME);
    }

    #[test]
    fn hex_scheme_replaces_default_palette() {
        let options = ChartOptions::default()
            .with_hex_color_scheme(["#000", "#FFFFFF"])
            .expect("valid hex");
        assert_eq!(options.palette().len(), 2);
        assert!(ChartOptions::default().with_hex_color_scheme(["nope"]).is_err());
    }
}
