//! Delimited text parsing: tokenizer and list reader

pub mod reader;
pub mod tokenizer;

pub use reader::{ColumnMapping, CsvListReader, RawRows};
pub use tokenizer::Tokenizer;

use crate::dialect::Dialect;
use crate::error::CsvResult;
use std::io::Cursor;

/// Tokenize every record of an in-memory string
pub fn parse_str(input: &str, dialect: &Dialect) -> CsvResult<Vec<Vec<String>>> {
    let mut tokenizer = Tokenizer::new(Cursor::new(input), dialect.clone());
    let mut rows = Vec::new();
    while let Some(row) = tokenizer.read_row()? {
        rows.push(row);
    }
    Ok(rows)
}
