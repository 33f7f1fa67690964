use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// 2^64, the first float vote count a `u64` cannot hold.
const VOTE_COUNT_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Ordering applied to entries after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortMode {
    /// Keep the order of the source document.
    #[default]
    None,
    Asc,
    Desc,
}

/// One vote option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub votes: u64,
}

impl Entry {
    #[must_use]
    pub fn new(title: impl Into<String>, votes: u64) -> Self {
        Self {
            title: title.into(),
            votes,
        }
    }
}

/// Normalized, immutable vote entries plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DataSet {
    entries: Vec<Entry>,
    total_votes: u64,
}

impl DataSet {
    /// Builds a data set from a JSON object of `title -> vote count`.
    ///
    /// Values that are not non-negative integers are skipped with a warning,
    /// and a non-object document yields an empty set. Neither case is fatal.
    #[must_use]
    pub fn from_json(data: &Value, sort: SortMode) -> Self {
        let Some(object) = data.as_object() else {
            warn!(
                received = json_kind(data),
                "cannot prepare vote data: expected an object, using an empty data set"
            );
            return Self::default();
        };

        let mut entries = Vec::with_capacity(object.len());
        for (title, value) in object {
            match vote_count(value) {
                Some(votes) => entries.push(Entry::new(title.as_str(), votes)),
                None => warn!(
                    title = %title,
                    received = json_kind(value),
                    "vote value is not a vote count, entry skipped"
                ),
            }
        }

        Self::from_entries(entries, sort)
    }

    /// Builds a data set from already typed entries.
    ///
    /// Entries are accepted in input order while the total still fits a
    /// `u64`; an entry that would overflow it is skipped with a warning.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>, sort: SortMode) -> Self {
        let mut total_votes = 0_u64;
        let mut entries: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| match total_votes.checked_add(entry.votes) {
                Some(total) => {
                    total_votes = total;
                    true
                }
                None => {
                    warn!(
                        title = %entry.title,
                        votes = entry.votes,
                        total_votes,
                        "vote total would overflow, entry skipped"
                    );
                    false
                }
            })
            .collect();
        match sort {
            SortMode::None => {}
            SortMode::Asc => entries.sort_by(|left, right| left.votes.cmp(&right.votes)),
            SortMode::Desc => entries.sort_by(|left, right| right.votes.cmp(&left.votes)),
        }

        debug!(entries = entries.len(), total_votes, ?sort, "normalized vote data");

        Self {
            entries,
            total_votes,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    /// Highest vote count, or 0 for an empty set.
    #[must_use]
    pub fn max_votes(&self) -> u64 {
        self.entries.iter().map(|entry| entry.votes).max().unwrap_or(0)
    }

    /// Share of the total as a rounded whole percentage; 0 when nobody voted.
    #[must_use]
    pub fn percent_rounded(&self, index: usize) -> u64 {
        match (self.entries.get(index), self.total_votes) {
            (Some(entry), total) if total > 0 => {
                ((entry.votes as f64 / total as f64) * 100.0).round() as u64
            }
            _ => 0,
        }
    }

    /// Share of the total in `[0, 1]`; 0 when nobody voted.
    #[must_use]
    pub fn share(&self, index: usize) -> f64 {
        match (self.entries.get(index), self.total_votes) {
            (Some(entry), total) if total > 0 => entry.votes as f64 / total as f64,
            _ => 0.0,
        }
    }
}

fn vote_count(value: &Value) -> Option<u64> {
    if let Some(votes) = value.as_u64() {
        return Some(votes);
    }
    // Integral floats such as `12.0` are accepted; fractions, negatives and
    // values past `u64::MAX` are not.
    value
        .as_f64()
        .filter(|votes| {
            votes.is_finite()
                && *votes >= 0.0
                && *votes < VOTE_COUNT_LIMIT
                && votes.fract() == 0.0
        })
        .map(|votes| votes as u64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DataSet, SortMode};

    fn titles(data: &DataSet) -> Vec<&str> {
        data.entries().iter().map(|entry| entry.title.as_str()).collect()
    }

    #[test]
    fn keeps_document_order_without_sorting() {
        let data = DataSet::from_json(&json!({"b": 2, "a": 1, "c": 3}), SortMode::None);
        assert_eq!(titles(&data), vec!["b", "a", "c"]);
        assert_eq!(data.total_votes(), 6);
    }

    #[test]
    fn skips_values_that_are_not_vote_counts() {
        let data = DataSet::from_json(
            &json!({"ok": 4, "text": "7", "neg": -1, "frac": 1.5, "whole": 2.0, "none": null}),
            SortMode::None,
        );
        assert_eq!(titles(&data), vec!["ok", "whole"]);
        assert_eq!(data.total_votes(), 6);
    }

    #[test]
    fn non_object_input_gives_empty_set() {
        let data = DataSet::from_json(&json!([1, 2, 3]), SortMode::Desc);
        assert!(data.is_empty());
        assert_eq!(data.total_votes(), 0);
        assert_eq!(data.max_votes(), 0);
    }

    #[test]
    fn ascending_sort_is_stable_for_ties() {
        let data = DataSet::from_json(&json!({"x": 5, "y": 1, "z": 5, "w": 1}), SortMode::Asc);
        assert_eq!(titles(&data), vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn entries_overflowing_the_total_are_skipped() {
        let data = DataSet::from_json(
            &json!({"A": 1.8e19, "B": 1.8e19, "C": 3}),
            SortMode::None,
        );
        assert_eq!(titles(&data), vec!["A", "C"]);
        assert_eq!(data.total_votes(), 18_000_000_000_000_000_003);
        let shares: f64 = (0..data.len()).map(|index| data.share(index)).sum();
        assert!((shares - 1.0).abs() < 1e-12);
    }

    #[test]
    fn float_counts_past_u64_range_are_skipped() {
        let data = DataSet::from_json(
            &json!({"huge": 2.0e19, "edge": 18_446_744_073_709_551_616.0_f64, "ok": 1}),
            SortMode::None,
        );
        assert_eq!(titles(&data), vec!["ok"]);
        assert_eq!(data.total_votes(), 1);
    }

    #[test]
    fn percent_of_empty_total_is_zero() {
        let data = DataSet::from_json(&json!({"a": 0, "b": 0}), SortMode::None);
        assert_eq!(data.percent_rounded(0), 0);
        assert_eq!(data.share(1), 0.0);
    }
}
