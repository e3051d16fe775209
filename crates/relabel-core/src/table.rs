//! In-memory table model backed by CSV files.
//!
//! A `Table` is an ordered header row plus ordered data rows; every cell is
//! either a string value or missing. CSV cannot tell an empty field from a
//! missing one, so empty fields read as missing and missing cells write back
//! as empty fields.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An in-memory CSV table: named columns, ordered rows, untyped text cells
/// that may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table from headers and rows. Rows shorter than the header row
    /// are padded with missing cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let mut table = Self { headers, rows };
        for row in &mut table.rows {
            row.resize(width, None);
        }
        table
    }

    /// Load the full CSV contents at `path`.
    ///
    /// The path is checked for existence before anything else happens, so a
    /// bad path fails before any row is touched.
    pub fn read_csv(path: &Path) -> Result<Self, TableError> {
        if !path.exists() {
            return Err(TableError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<Option<String>> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    /// Serialise the table to CSV at `path`, preserving column and row order.
    pub fn write_csv(&self, path: &Path) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a named column, appending it with all cells missing when it
    /// does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.headers.len() - 1
    }

    /// Cell value at (row, column); `None` for a missing cell.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows[row][column].as_deref()
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: Option<String>) {
        self.rows[row][column] = value;
    }
}
