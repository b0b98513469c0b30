//! Field escaping for the writer
//!
//! Mirrors the tokenizer: a field is quoted when reading it back unquoted
//! would change it, and every quote character inside a quoted field is
//! doubled.
//!
//! Quoting rules (in priority order):
//! 1. Quote if the quote mode forces the column
//! 2. Quote if the field contains the delimiter, the quote character, `\r` or `\n`
//! 3. Quote if surrounding spaces are insignificant and the field starts or ends with a space
//! 4. Quote a row made of one empty field, which would otherwise be an empty line
//! 5. Quote the first field when the first physical line would be taken for a comment

use crate::dialect::{Dialect, QuoteMode};

/// Escaping engine for one dialect
#[derive(Debug, Clone)]
pub struct CsvEncoder {
    dialect: Dialect,
}

impl CsvEncoder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Whether a field needs quotes, ignoring row-level rules
    pub fn needs_quoting(&self, value: &str, column_number: usize) -> bool {
        if self.dialect.quote_mode().forces_quote(column_number) {
            return true;
        }

        let delimiter = self.dialect.delimiter();
        let quote = self.dialect.quote_char();
        if value
            .chars()
            .any(|c| c == delimiter || c == quote || c == '\n' || c == '\r')
        {
            return true;
        }

        self.dialect.surrounding_spaces_need_quotes()
            && (value.starts_with(' ') || value.ends_with(' '))
    }

    /// Wrap a field in quotes, doubling embedded quote characters
    pub fn quote(&self, value: &str) -> String {
        let quote = self.dialect.quote_char();
        let mut result = String::with_capacity(value.len() + 2);
        result.push(quote);
        for ch in value.chars() {
            if ch == quote {
                result.push(quote);
            }
            result.push(ch);
        }
        result.push(quote);
        result
    }

    /// Encode one field with smart quoting
    pub fn encode(&self, value: &str, column_number: usize) -> String {
        if self.needs_quoting(value, column_number) {
            self.quote(value)
        } else {
            value.to_string()
        }
    }

    /// Encode a full record without its line terminator
    pub fn encode_row<S: AsRef<str>>(&self, fields: &[S]) -> String {
        if let [only] = fields {
            if only.as_ref().is_empty() {
                return self.quote("");
            }
        }

        let delimiter = self.dialect.delimiter();
        let mut line = String::new();
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                line.push(delimiter);
            }
            line.push_str(&self.encode(field.as_ref(), index + 1));
        }

        if let Some(first) = fields.first() {
            let first = first.as_ref();
            let first_physical_line = line.split(['\r', '\n']).next().unwrap_or_default();
            if self.dialect.is_comment(first_physical_line) && !self.needs_quoting(first, 1) {
                let unquoted_len = first.len();
                line.replace_range(..unquoted_len, &self.quote(first));
            }
        }
        line
    }

    pub fn quote_mode(&self) -> &QuoteMode {
        self.dialect.quote_mode()
    }
}
