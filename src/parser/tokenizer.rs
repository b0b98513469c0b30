//! Quote-aware tokenizer turning physical lines into logical records
//!
//! The tokenizer pulls one physical line at a time from a [`BufRead`] and
//! walks it with an explicit state machine. A quoted field that runs past the
//! end of a line keeps the line break and pulls the next line, so one record
//! may span several physical lines.
//!
//! A physical line ends at `\n`, `\r\n` or a bare `\r`.

use crate::dialect::Dialect;
use crate::error::{CsvError, CsvResult};
use std::io::{self, BufRead};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed for the current field yet
    FieldStart,
    UnquotedField,
    QuotedField,
    /// A quote was seen inside a quoted field: escaped quote or closing quote
    QuoteInQuotedField,
    /// Closing quote followed by insignificant spaces
    AfterQuotedField,
}

/// Splits a character stream into records of raw fields
#[derive(Debug)]
pub struct Tokenizer<R> {
    reader: R,
    dialect: Dialect,
    line: String,
    bytes: Vec<u8>,
    untokenized: String,
    line_number: usize,
    row_number: usize,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R, dialect: Dialect) -> Self {
        Self {
            reader,
            dialect,
            line: String::new(),
            bytes: Vec::new(),
            untokenized: String::new(),
            line_number: 0,
            row_number: 0,
        }
    }

    /// Read the next record, or `None` at end of data
    pub fn read_row(&mut self) -> CsvResult<Option<Vec<String>>> {
        let mut columns = Vec::new();
        if self.read_columns(&mut columns)? {
            Ok(Some(columns))
        } else {
            Ok(None)
        }
    }

    /// Read the next record into `columns`, returning `false` at end of data.
    ///
    /// `columns` is cleared first. On error the stream stays positioned after
    /// the offending line and the row counter is not advanced.
    pub fn read_columns(&mut self, columns: &mut Vec<String>) -> CsvResult<bool> {
        columns.clear();

        let mut terminator = loop {
            let Some(terminator) = self.next_line()? else {
                return Ok(false);
            };
            if self.line.is_empty() && self.dialect.ignore_empty_lines() {
                debug!(line = self.line_number, "skipping empty line");
                continue;
            }
            if self.dialect.is_comment(&self.line) {
                debug!(line = self.line_number, "skipping comment line");
                continue;
            }
            break terminator;
        };

        self.untokenized.clear();
        self.untokenized.push_str(&self.line);

        let quote = self.dialect.quote_char();
        let delimiter = self.dialect.delimiter();
        let trim = self.dialect.surrounding_spaces_need_quotes();
        let record_start_line = self.line_number;

        let mut state = State::FieldStart;
        let mut field = String::new();
        let mut chars: Vec<char> = self.line.chars().collect();
        let mut pos = 0;

        loop {
            let Some(c) = chars.get(pos).copied() else {
                match state {
                    State::QuotedField => {
                        let lines_in_record = self.line_number - record_start_line + 1;
                        if let Some(max) = self.dialect.max_lines_per_row() {
                            if lines_in_record >= max {
                                return Err(CsvError::parse(
                                    format!(
                                        "max number of lines ({}) exceeded while reading quoted column beginning on line {}",
                                        max, record_start_line
                                    ),
                                    self.line_number,
                                    self.row_number + 1,
                                ));
                            }
                        }

                        field.push_str(terminator);
                        self.untokenized.push_str(terminator);
                        let Some(next_terminator) = self.next_line()? else {
                            return Err(CsvError::parse(
                                format!(
                                    "unexpected end of file while reading quoted column beginning on line {}",
                                    record_start_line
                                ),
                                self.line_number,
                                self.row_number + 1,
                            ));
                        };
                        terminator = next_terminator;
                        self.untokenized.push_str(&self.line);
                        chars = self.line.chars().collect();
                        pos = 0;
                        continue;
                    }
                    State::UnquotedField => columns.push(finish_unquoted(&mut field, trim)),
                    State::FieldStart
                    | State::QuoteInQuotedField
                    | State::AfterQuotedField => columns.push(std::mem::take(&mut field)),
                }
                break;
            };
            pos += 1;

            state = match state {
                State::FieldStart => {
                    if c == quote {
                        State::QuotedField
                    } else if c == delimiter {
                        columns.push(String::new());
                        State::FieldStart
                    } else if c == ' ' && trim {
                        State::FieldStart
                    } else {
                        field.push(c);
                        State::UnquotedField
                    }
                }
                State::UnquotedField => {
                    if c == delimiter {
                        columns.push(finish_unquoted(&mut field, trim));
                        State::FieldStart
                    } else {
                        field.push(c);
                        State::UnquotedField
                    }
                }
                State::QuotedField => {
                    if c == quote {
                        State::QuoteInQuotedField
                    } else {
                        field.push(c);
                        State::QuotedField
                    }
                }
                State::QuoteInQuotedField => {
                    if c == quote {
                        field.push(quote);
                        State::QuotedField
                    } else if c == delimiter {
                        columns.push(std::mem::take(&mut field));
                        State::FieldStart
                    } else if c == ' ' && trim {
                        State::AfterQuotedField
                    } else {
                        return Err(self.unexpected_after_quote(c, columns.len() + 1));
                    }
                }
                State::AfterQuotedField => {
                    if c == delimiter {
                        columns.push(std::mem::take(&mut field));
                        State::FieldStart
                    } else if c == ' ' {
                        State::AfterQuotedField
                    } else {
                        return Err(self.unexpected_after_quote(c, columns.len() + 1));
                    }
                }
            };
        }

        self.row_number += 1;
        trace!(
            row = self.row_number,
            line = self.line_number,
            columns = columns.len(),
            "tokenized record"
        );
        Ok(true)
    }

    /// Physical lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Logical records produced so far
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    /// Raw text of the last record, embedded line breaks included
    pub fn untokenized_row(&self) -> &str {
        &self.untokenized
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Pull one physical line into `self.line` without its terminator.
    fn next_line(&mut self) -> CsvResult<Option<&'static str>> {
        self.line.clear();
        self.bytes.clear();

        let mut terminator = "";
        let mut consumed = false;
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                break;
            }
            consumed = true;
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    let line_break = available[end];
                    self.bytes.extend_from_slice(&available[..end]);
                    self.reader.consume(end + 1);
                    terminator = if line_break == b'\n' {
                        "\n"
                    } else if self.reader.fill_buf()?.first() == Some(&b'\n') {
                        self.reader.consume(1);
                        "\r\n"
                    } else {
                        "\r"
                    };
                    break;
                }
                None => {
                    let len = available.len();
                    self.bytes.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
        if !consumed {
            return Ok(None);
        }

        let text = std::str::from_utf8(&self.bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.line.push_str(text);
        self.line_number += 1;
        Ok(Some(terminator))
    }

    fn unexpected_after_quote(&self, c: char, column: usize) -> CsvError {
        CsvError::parse(
            format!(
                "unexpected character '{}' after closing quote in column {}",
                c.escape_default(),
                column
            ),
            self.line_number,
            self.row_number + 1,
        )
    }
}

fn finish_unquoted(field: &mut String, trim: bool) -> String {
    let value = std::mem::take(field);
    if trim {
        value.trim_matches(' ').to_string()
    } else {
        value
    }
}
