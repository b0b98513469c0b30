//! Execution context tracking for readers and writers
//!
//! Every value produced and every failure raised is attributed to a physical
//! line, a logical row and a 1-based column through [`CsvContext`].

use std::fmt;

/// Position of the reader or writer at the moment a cell is processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvContext {
    /// Physical lines consumed so far (including embedded line breaks)
    pub line_number: usize,
    /// Logical records consumed so far
    pub row_number: usize,
    /// 1-based column currently being processed, 0 when no column is active
    pub column_number: usize,
    /// Raw fields of the current row
    pub row_source: Vec<String>,
}

impl CsvContext {
    pub fn new(line_number: usize, row_number: usize, column_number: usize) -> Self {
        Self {
            line_number,
            row_number,
            column_number,
            row_source: Vec::new(),
        }
    }

    pub fn with_row_source(mut self, row_source: Vec<String>) -> Self {
        self.row_source = row_source;
        self
    }

    /// Move the context to a freshly tokenized row
    pub(crate) fn start_row(&mut self, line_number: usize, row_number: usize, row: &[String]) {
        self.line_number = line_number;
        self.row_number = row_number;
        self.column_number = 0;
        self.row_source.clear();
        self.row_source.extend_from_slice(row);
    }
}

impl fmt::Display for CsvContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, row {}, column {}",
            self.line_number, self.row_number, self.column_number
        )
    }
}
