// libs/shared/database/src/table.rs
use async_trait::async_trait;

use crate::DatabaseError;

/// Access to named tables. Every write replaces the whole table.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn read_all(&self, table: &str) -> Result<Table, DatabaseError>;

    async fn overwrite_all(&self, table: &str, contents: &Table) -> Result<(), DatabaseError>;
}

/// A header row plus string cells. Rows are always as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self { headers, rows: Vec::with_capacity(rows.len()) };
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
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

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn require_column(&self, table: &str, name: &str) -> Result<usize, DatabaseError> {
        self.column(name).ok_or_else(|| DatabaseError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }

    /// Returns the index of `name`, appending an empty column when it is absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Appends a row, padding short rows and widening the header for long ones.
    pub fn push_row(&mut self, mut values: Vec<String>) {
        while self.headers.len() < values.len() {
            let name = format!("column_{}", self.headers.len() + 1);
            self.ensure_column(&name);
        }
        values.resize(self.headers.len(), String::new());
        self.rows.push(values);
    }

    /// Appends a row given as `(column, value)` pairs; unknown columns are created.
    pub fn push_record(&mut self, fields: &[(&str, String)]) {
        let indices: Vec<usize> = fields.iter().map(|(name, _)| self.ensure_column(name)).collect();
        let mut row = vec![String::new(); self.headers.len()];
        for (index, (_, value)) in indices.into_iter().zip(fields) {
            row[index] = value.clone();
        }
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(values) = self.rows.get_mut(row) {
            if values.len() <= column {
                values.resize(column + 1, String::new());
            }
            values[column] = value.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded() {
        let table = Table::from_parts(
            vec!["A".into(), "B".into(), "C".into()],
            vec![vec!["1".into()]],
        );
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
    }

    #[test]
    fn push_record_creates_missing_columns() {
        let mut table = Table::new(["PatientID"]);
        table.push_record(&[("PatientID", "7".into()), ("Status", "Confirmed".into())]);

        assert_eq!(table.headers(), ["PatientID", "Status"]);
        let status = table.column("Status").unwrap();
        assert_eq!(table.cell(0, status), "Confirmed");
    }

    #[test]
    fn ensure_column_widens_existing_rows() {
        let mut table = Table::new(["Date"]);
        table.push_row(vec!["2025-09-01".into()]);
        let index = table.ensure_column("Status");
        table.set_cell(0, index, "Available");

        assert_eq!(table.rows()[0], vec!["2025-09-01", "Available"]);
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let table = Table::new(["Date"]);
        assert_eq!(table.cell(3, 9), "");
    }
}
