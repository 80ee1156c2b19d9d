use std::path::Path;

use crate::error::BenchError;

/// An in-memory CSV file: ordered headers plus string cells.
///
/// Missing trailing cells read as empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self, BenchError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn write(&self, path: &Path) -> Result<(), BenchError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            let padded = (0..self.headers.len()).map(|i| row.get(i).map_or("", String::as_str));
            writer.write_record(padded)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First column matching any of `names`, in the order given.
    pub fn column_any(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| self.column(name))
    }

    pub fn get(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if self.column(to).is_some() {
            return;
        }
        if let Some(idx) = self.column(from) {
            self.headers[idx] = to.to_string();
        }
    }

    /// Overwrites column `name`, appending it when absent.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        let idx = match self.column(name) {
            Some(idx) => idx,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= idx {
                row.resize(idx + 1, String::new());
            }
            row[idx] = value;
        }
    }

    /// Values of column `col`, one per row.
    pub fn column_values(&self, col: usize) -> Vec<String> {
        (0..self.rows.len())
            .map(|row| self.get(row, col).to_string())
            .collect()
    }
}
