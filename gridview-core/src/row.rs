//! Fetched row objects.

use crate::{BindingTuple, CellValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One materialized row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extract the values of `columns` in order. Absent columns read as `Null`.
    pub fn binding_tuple(&self, columns: &[String]) -> BindingTuple {
        columns
            .iter()
            .map(|column| self.0.get(column).cloned().unwrap_or(CellValue::Null))
            .collect()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_tuple_follows_column_order() {
        let row = Row::new().with("a", 1).with("b", "x");
        let tuple = row.binding_tuple(&["b".to_string(), "a".to_string()]);
        assert_eq!(tuple, vec![CellValue::from("x"), CellValue::from(1)]);
    }

    #[test]
    fn test_binding_tuple_missing_column_is_null() {
        let row = Row::new().with("a", 1);
        let tuple = row.binding_tuple(&["missing".to_string()]);
        assert_eq!(tuple, vec![CellValue::Null]);
    }

    #[test]
    fn test_from_iter_and_serde_shape() {
        let row: Row = vec![("id", CellValue::from(5)), ("name", CellValue::from("n"))]
            .into_iter()
            .collect();
        assert_eq!(row.len(), 2);
        let json = serde_json::to_value(&row).expect("row serializes");
        assert_eq!(json, serde_json::json!({"id": 5, "name": "n"}));
    }
}
