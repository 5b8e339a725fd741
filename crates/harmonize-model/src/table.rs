use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{HarmonizeError, Result};
use crate::schema::TargetSchema;
use crate::value::CellValue;

/// A batch of source records sharing one header row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBatch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// Where the batch came from (file path or caller label).
    pub source: Option<String>,
    /// Hex SHA-256 of the raw input, when read from a file.
    pub digest: Option<String>,
}

impl RecordBatch {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Appends a row, padding short rows with nulls.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        if cells.len() < self.headers.len() {
            cells.resize(self.headers.len(), CellValue::Null);
        }
        self.rows.push(cells);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|cells| RowView {
            headers: &self.headers,
            cells,
        })
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|cells| RowView {
            headers: &self.headers,
            cells,
        })
    }

    /// First non-blank value of a column, or null when the column is empty.
    pub fn sample_value(&self, column_index: usize) -> CellValue {
        self.rows
            .iter()
            .filter_map(|row| row.get(column_index))
            .find(|cell| !cell.is_blank())
            .cloned()
            .unwrap_or_default()
    }

    /// Structural checks that make a batch unprocessable as a whole.
    pub fn validate(&self) -> Result<()> {
        if self.headers.is_empty() {
            return Err(HarmonizeError::InvalidBatch("missing header row".to_string()));
        }
        let mut seen = BTreeSet::new();
        for (idx, header) in self.headers.iter().enumerate() {
            let key = header.trim().to_lowercase();
            if key.is_empty() {
                return Err(HarmonizeError::InvalidBatch(format!(
                    "empty column name at position {}",
                    idx + 1
                )));
            }
            if !seen.insert(key) {
                return Err(HarmonizeError::InvalidBatch(format!(
                    "duplicate column name '{}'",
                    header.trim()
                )));
            }
        }
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() > self.headers.len() {
                return Err(HarmonizeError::InvalidBatch(format!(
                    "row {} has {} cells but the header has {}",
                    idx + 1,
                    row.len(),
                    self.headers.len()
                )));
            }
        }
        Ok(())
    }
}

/// Borrowed view of one source row, keyed by header.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    headers: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> RowView<'a> {
    pub fn new(headers: &'a [String], cells: &'a [CellValue]) -> Self {
        Self { headers, cells }
    }

    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cells.get(idx)
    }

    /// Cells in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + use<'a> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }
}

/// One output record keyed by target field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HarmonizedRecord {
    values: BTreeMap<String, CellValue>,
}

impl HarmonizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: CellValue) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in schema order; fields absent from the record yield `None`.
    pub fn ordered<'a>(
        &'a self,
        schema: &'a TargetSchema,
    ) -> impl Iterator<Item = (&'a str, Option<&'a CellValue>)> {
        schema.names().map(|name| (name, self.values.get(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, TargetField};

    fn batch() -> RecordBatch {
        let mut batch = RecordBatch::new(vec!["cliente".to_string(), "cantidad".to_string()]);
        batch.push_row(vec![CellValue::text(""), CellValue::text("2")]);
        batch.push_row(vec![CellValue::text("María García")]);
        batch
    }

    #[test]
    fn short_rows_are_padded() {
        let batch = batch();
        assert_eq!(batch.rows[1].len(), 2);
        assert_eq!(batch.rows[1][1], CellValue::Null);
    }

    #[test]
    fn sample_value_skips_blanks() {
        let batch = batch();
        assert_eq!(batch.sample_value(0), CellValue::text("María García"));
        assert_eq!(batch.sample_value(1), CellValue::text("2"));
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let batch = RecordBatch::new(vec!["Precio".to_string(), " precio ".to_string()]);
        let err = batch.validate().expect_err("duplicate header");
        assert!(err.to_string().contains("duplicate column name"));
    }

    #[test]
    fn long_rows_are_rejected() {
        let mut batch = RecordBatch::new(vec!["a".to_string()]);
        batch.rows.push(vec![CellValue::text("1"), CellValue::text("2")]);
        assert!(batch.validate().is_err());
    }

    #[test]
    fn ordered_follows_schema() {
        let schema = TargetSchema::new(vec![
            TargetField::new("customer_name", FieldType::String),
            TargetField::new("quantity", FieldType::Integer),
        ]);
        let mut record = HarmonizedRecord::new();
        record.insert("quantity", CellValue::Integer(2));
        let ordered: Vec<_> = record.ordered(&schema).collect();
        assert_eq!(ordered[0], ("customer_name", None));
        assert_eq!(ordered[1], ("quantity", Some(&CellValue::Integer(2))));
    }
}
