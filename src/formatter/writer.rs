//! List writer: processes values, escapes them and writes records

use super::encoder::CsvEncoder;
use crate::context::CsvContext;
use crate::dialect::Dialect;
use crate::error::{CsvError, CsvResult};
use crate::processor::{execute_value_chains, CellValue, Chain};
use std::io::Write;
use tracing::trace;

/// Writes records built from raw strings or processed values
#[derive(Debug)]
pub struct CsvListWriter<W: Write> {
    writer: W,
    encoder: CsvEncoder,
    end_of_line: String,
    context: CsvContext,
}

impl<W: Write> CsvListWriter<W> {
    pub fn new(writer: W, dialect: Dialect) -> Self {
        Self {
            writer,
            end_of_line: dialect.end_of_line().to_string(),
            encoder: CsvEncoder::new(dialect),
            context: CsvContext::default(),
        }
    }

    /// Write the header row
    pub fn write_header<S: AsRef<str>>(&mut self, header: &[S]) -> CsvResult<()> {
        self.write(header)
    }

    /// Write one record of raw strings
    pub fn write<S: AsRef<str>>(&mut self, fields: &[S]) -> CsvResult<()> {
        if fields.is_empty() {
            return Err(CsvError::configuration("cannot write a row without columns"));
        }
        let line = self.encoder.encode_row(fields);
        self.write_line(&line)?;

        self.context.row_number += 1;
        self.context.line_number += 1 + count_line_breaks(&line);
        trace!(row = self.context.row_number, "wrote record");
        Ok(())
    }

    /// Run one chain per column, then write the processed values.
    ///
    /// Nothing is written if any column fails.
    pub fn write_with(&mut self, values: &[CellValue], chains: &mut [Option<Chain>]) -> CsvResult<()> {
        let mut context = CsvContext::new(
            self.context.line_number + 1,
            self.context.row_number + 1,
            0,
        )
        .with_row_source(values.iter().map(ToString::to_string).collect());

        let processed = execute_value_chains(values.to_vec(), chains, &mut context)?;
        let fields: Vec<String> = processed.iter().map(ToString::to_string).collect();
        self.write(&fields)
    }

    /// Write a comment line verbatim
    pub fn write_comment(&mut self, comment: &str) -> CsvResult<()> {
        if comment.contains(['\n', '\r']) {
            return Err(CsvError::configuration(
                "a comment cannot contain line breaks",
            ));
        }
        self.write_line(comment)?;
        self.context.line_number += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> CsvResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Physical lines written so far
    pub fn line_number(&self) -> usize {
        self.context.line_number
    }

    /// Records written so far, header included
    pub fn row_number(&self) -> usize {
        self.context.row_number
    }

    pub fn into_inner(mut self) -> CsvResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_line(&mut self, line: &str) -> CsvResult<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(self.end_of_line.as_bytes())?;
        Ok(())
    }
}

/// Line breaks as the tokenizer counts them: `\r\n` is one, a bare `\r` or `\n` is one
fn count_line_breaks(text: &str) -> usize {
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => count += 1,
            '\r' => {
                count += 1;
                chars.next_if_eq(&'\n');
            }
            _ => {}
        }
    }
    count
}
