use crate::core::{ColorAssignment, DataSet};
use crate::render::Color;

/// Immutable inputs every variant lays out and paints from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    data: DataSet,
    colors: ColorAssignment,
    votes_label: String,
}

impl ChartModel {
    #[must_use]
    pub fn new(data: DataSet, colors: ColorAssignment, votes_label: impl Into<String>) -> Self {
        Self {
            data,
            colors,
            votes_label: votes_label.into(),
        }
    }

    #[must_use]
    pub fn data(&self) -> &DataSet {
        &self.data
    }

    #[must_use]
    pub fn colors(&self) -> &ColorAssignment {
        &self.colors
    }

    #[must_use]
    pub fn color(&self, index: usize) -> Color {
        self.colors.color(index)
    }

    #[must_use]
    pub fn votes_label(&self) -> &str {
        &self.votes_label
    }

    /// Vote count of entry `index`, 0 when out of range.
    #[must_use]
    pub fn votes(&self, index: usize) -> u64 {
        self.data.get(index).map_or(0, |entry| entry.votes)
    }

    #[must_use]
    pub fn title(&self, index: usize) -> &str {
        self.data.get(index).map_or("", |entry| entry.title.as_str())
    }
}
