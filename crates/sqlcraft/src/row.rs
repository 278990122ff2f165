//! Result rows.

use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: column names mapped to values, in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Append a cell. Backends call this in column order.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.push((column.into(), value.into()));
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Value at a column position.
    pub fn get_idx(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.cells
    }

    /// Take the first cell's value, consuming the row.
    pub(crate) fn into_first(self) -> Option<Value> {
        self.cells.into_iter().next().map(|(_, v)| v)
    }

    /// JSON object view of the row.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .cells
            .iter()
            .map(|(name, v)| {
                let json = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
                (name.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, v) in &self.cells {
            map.serialize_entry(name, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_column_order() {
        let row: Row = [("id", Value::Int(1)), ("name", Value::from("John"))]
            .into_iter()
            .collect();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(row.get("name"), Some(&Value::from("John")));
        assert_eq!(row.get_idx(0), Some(&Value::Int(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn json_view() {
        let mut row = Row::new();
        row.push("now", 4);
        row.push("gone", Value::Null);
        assert_eq!(
            row.to_json(),
            serde_json::json!({"now": 4, "gone": null})
        );
    }
}
