//! Row shapes returned to callers.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use super::value::SqlValue;

/// Ordered mapping of column label to value for one browsed row.
///
/// Insertion order is preserved. Inserting an existing label replaces its
/// value in place, keeping the label's original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMapping {
    entries: Vec<(String, SqlValue)>,
}

impl RowMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, value: SqlValue) {
        let label = label.into();
        match self.entries.iter_mut().find(|(k, _)| *k == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RowMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Rectangular matrix of string cells fed into and read out of rule
/// evaluation.
///
/// Built from possibly jagged rows: the width is the widest input row and
/// shorter rows are right-padded with empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(from = "Vec<Vec<Option<String>>>", into = "Vec<Vec<String>>")]
pub struct RuleRowSet {
    width: usize,
    rows: Vec<Vec<String>>,
}

impl RuleRowSet {
    /// Pad jagged rows into a rectangle.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { width, rows }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl From<Vec<Vec<String>>> for RuleRowSet {
    fn from(rows: Vec<Vec<String>>) -> Self {
        RuleRowSet::new(rows)
    }
}

impl From<Vec<Vec<Option<String>>>> for RuleRowSet {
    fn from(rows: Vec<Vec<Option<String>>>) -> Self {
        RuleRowSet::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
                .collect(),
        )
    }
}

impl From<RuleRowSet> for Vec<Vec<String>> {
    fn from(set: RuleRowSet) -> Self {
        set.rows
    }
}

impl<const N: usize> From<Vec<[&str; N]>> for RuleRowSet {
    fn from(rows: Vec<[&str; N]>) -> Self {
        RuleRowSet::new(
            rows.into_iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }
}
