//! Column-oriented table of meteorological time series.

use crate::error::BatchError;
use rustc_hash::FxHashMap;

/// A timestamp index plus named `f64` columns
///
/// Every column has exactly one value per index entry. Missing values are NaN.
/// Column order is kept as inserted so output columns land after the inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeteoTable {
    index: Vec<i64>,
    names: Vec<String>,
    columns: FxHashMap<String, Vec<f64>>,
}

impl MeteoTable {
    /// Empty table over the given timestamps
    pub fn new(index: Vec<i64>) -> Self {
        Self {
            index,
            names: Vec::new(),
            columns: FxHashMap::default(),
        }
    }

    /// Builder form of [`MeteoTable::insert_column`]
    ///
    /// # Errors
    ///
    /// [`BatchError::LengthMismatch`] when `values` does not match the index.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, BatchError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Add a column, replacing any column of the same name in place
    ///
    /// # Errors
    ///
    /// [`BatchError::LengthMismatch`] when `values` does not match the index.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), BatchError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(BatchError::LengthMismatch {
                column: name,
                expected: self.index.len(),
                found: values.len(),
            });
        }
        if !self.columns.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Values of a column, if present
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Timestamps, one per row
    pub fn index(&self) -> &[i64] {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_replaces_in_place() {
        let mut table = MeteoTable::new(vec![1, 2])
            .with_column("WS", vec![1.0, 2.0])
            .unwrap()
            .with_column("P", vec![1000.0, 990.0])
            .unwrap();
        table.insert_column("WS", vec![3.0, 4.0]).unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), ["WS", "P"]);
        assert_eq!(table.column("WS"), Some(&[3.0, 4.0][..]));
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert_eq!(table.index(), &[1, 2]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = MeteoTable::new(vec![1, 2, 3])
            .with_column("RH", vec![50.0])
            .unwrap_err();
        assert!(matches!(
            err,
            BatchError::LengthMismatch { expected: 3, found: 1, .. }
        ));
    }

    #[test]
    fn test_missing_column_is_none() {
        let table = MeteoTable::new(Vec::new());
        assert!(table.is_empty());
        assert!(table.column("T_air").is_none());
    }
}
