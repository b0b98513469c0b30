//! Row-level reader over the tokenizer
//!
//! [`CsvListReader`] exposes records as lists, optionally running one
//! processor [`Chain`] per column, and keeps the [`CsvContext`] in step with
//! the tokenizer so every failure names its line, row and column.

use super::tokenizer::Tokenizer;
use crate::context::CsvContext;
use crate::dialect::Dialect;
use crate::error::{CsvError, CsvResult};
use crate::processor::{execute_chains, CellValue, Chain};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Ordered column-name to chain mapping for reads by name.
///
/// Insertion order is output order. A `None` chain keeps the raw string.
#[derive(Debug, Default)]
pub struct ColumnMapping {
    entries: Vec<(String, Option<Chain>)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a column and keep its raw string
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), None));
        self
    }

    /// Select a column and process it with `chain`
    pub fn column_with(mut self, name: impl Into<String>, chain: Chain) -> Self {
        self.entries.push((name.into(), Some(chain)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// Reads records as lists of raw strings or processed values
#[derive(Debug)]
pub struct CsvListReader<R> {
    tokenizer: Tokenizer<R>,
    header: Option<Vec<String>>,
    row: Vec<String>,
    /// Whether `row` holds a complete record that processors may run on
    row_ready: bool,
    context: CsvContext,
}

impl CsvListReader<BufReader<File>> {
    /// Open a file with the given dialect
    pub fn from_path(path: impl AsRef<Path>, dialect: Dialect) -> CsvResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), dialect))
    }
}

impl<R: BufRead> CsvListReader<R> {
    pub fn new(reader: R, dialect: Dialect) -> Self {
        Self {
            tokenizer: Tokenizer::new(reader, dialect),
            header: None,
            row: Vec::new(),
            row_ready: false,
            context: CsvContext::default(),
        }
    }

    /// Read the header row and remember it for reads by name.
    ///
    /// With `first_line_check`, fails unless nothing has been read yet.
    pub fn header(&mut self, first_line_check: bool) -> CsvResult<Option<Vec<String>>> {
        if first_line_check && self.tokenizer.line_number() != 0 {
            return Err(CsvError::configuration(format!(
                "the header must be read from the first line of the file, but the reader is at line {}",
                self.tokenizer.line_number()
            )));
        }
        if !self.read_row()? {
            return Ok(None);
        }
        debug!(columns = self.row.len(), "read header");
        self.header = Some(self.row.clone());
        Ok(self.header.clone())
    }

    /// Read the next record as raw strings, or `None` at end of data
    pub fn read(&mut self) -> CsvResult<Option<Vec<String>>> {
        if self.read_row()? {
            Ok(Some(self.row.clone()))
        } else {
            Ok(None)
        }
    }

    /// Read the next record and run one chain per column.
    ///
    /// `chains` must have one entry per column of the record.
    pub fn read_with(&mut self, chains: &mut [Option<Chain>]) -> CsvResult<Option<Vec<CellValue>>> {
        if !self.read_row()? {
            return Ok(None);
        }
        self.execute_processors(chains).map(Some)
    }

    /// Read the next record keeping only the mapped columns, in mapping order.
    ///
    /// Requires a header; every mapped name must be in it. Both checks run
    /// before the record is read.
    pub fn read_mapped(&mut self, mapping: &mut ColumnMapping) -> CsvResult<Option<Vec<CellValue>>> {
        let indexes = self.resolve(mapping)?;
        if !self.read_row()? {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(indexes.len());
        for ((name, chain), index) in mapping.entries.iter_mut().zip(indexes) {
            self.context.column_number = index + 1;
            let Some(raw) = self.row.get(index) else {
                return Err(CsvError::processing(
                    format!(
                        "column '{}' (column {}) is missing from a row with {} columns",
                        name,
                        index + 1,
                        self.row.len()
                    ),
                    &self.context,
                ));
            };
            let value = CellValue::Str(raw.clone());
            let processed = match chain {
                Some(chain) => chain
                    .execute(value, &self.context)
                    .map_err(|e| e.with_context(&self.context))?,
                None => value,
            };
            values.push(processed);
        }
        Ok(Some(values))
    }

    /// Run chains on the last record read, for callers that only learn the
    /// column count after reading.
    pub fn execute_processors(&mut self, chains: &mut [Option<Chain>]) -> CsvResult<Vec<CellValue>> {
        if !self.row_ready {
            return Err(CsvError::configuration(
                "no complete row is available: nothing has been read yet, the last read failed or the end of data was reached",
            ));
        }
        execute_chains(&self.row, chains, &mut self.context)
    }

    /// Iterate over the remaining records as raw strings
    pub fn rows(&mut self) -> RawRows<'_, R> {
        RawRows { reader: self }
    }

    /// Header recorded by the last [`header`](Self::header) call
    pub fn header_row(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Number of columns in the last record read
    pub fn length(&self) -> usize {
        self.row.len()
    }

    pub fn line_number(&self) -> usize {
        self.tokenizer.line_number()
    }

    pub fn row_number(&self) -> usize {
        self.tokenizer.row_number()
    }

    /// Raw text of the last record
    pub fn untokenized_row(&self) -> &str {
        self.tokenizer.untokenized_row()
    }

    pub fn context(&self) -> &CsvContext {
        &self.context
    }

    pub fn dialect(&self) -> &Dialect {
        self.tokenizer.dialect()
    }

    pub fn into_inner(self) -> R {
        self.tokenizer.into_inner()
    }

    fn read_row(&mut self) -> CsvResult<bool> {
        self.row_ready = false;
        match self.tokenizer.read_columns(&mut self.row) {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(e) => {
                self.row.clear();
                return Err(e);
            }
        }
        self.row_ready = true;
        self.context.start_row(
            self.tokenizer.line_number(),
            self.tokenizer.row_number(),
            &self.row,
        );
        Ok(true)
    }

    fn resolve(&self, mapping: &ColumnMapping) -> CsvResult<Vec<usize>> {
        let header = self.header.as_ref().ok_or_else(|| {
            CsvError::configuration("the header must be read before reading columns by name")
        })?;
        mapping
            .names()
            .map(|name| {
                header.iter().position(|column| column == name).ok_or_else(|| {
                    CsvError::configuration(format!(
                        "mapped column '{}' is not present in the header {:?}",
                        name, header
                    ))
                })
            })
            .collect()
    }
}

/// Iterator over raw records, see [`CsvListReader::rows`]
#[derive(Debug)]
pub struct RawRows<'r, R> {
    reader: &'r mut CsvListReader<R>,
}

impl<R: BufRead> Iterator for RawRows<'_, R> {
    type Item = CsvResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read().transpose()
    }
}
