//! Dialect descriptors for reading and writing delimited text
//!
//! A [`Dialect`] is fixed once a reader or writer is built. Use one of the
//! presets or [`Dialect::builder`] to describe another variant.

pub mod comment;

pub use comment::CommentMatcher;

use crate::error::{CsvError, CsvResult};
use std::collections::BTreeSet;

/// Named delimiter options accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterType {
    /// Comma delimiter (,)
    Comma,
    /// Tab delimiter (\\t)
    Tab,
    /// Pipe delimiter (|)
    Pipe,
    /// Semicolon delimiter (;)
    Semicolon,
}

impl DelimiterType {
    pub fn as_char(&self) -> char {
        match self {
            DelimiterType::Comma => ',',
            DelimiterType::Tab => '\t',
            DelimiterType::Pipe => '|',
            DelimiterType::Semicolon => ';',
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "comma" | "," => Ok(DelimiterType::Comma),
            "tab" | "\t" => Ok(DelimiterType::Tab),
            "pipe" | "|" => Ok(DelimiterType::Pipe),
            "semicolon" | ";" => Ok(DelimiterType::Semicolon),
            other => Err(format!(
                "Invalid delimiter '{}'. Use 'comma', 'tab', 'pipe' or 'semicolon'",
                other
            )),
        }
    }
}

/// When the writer wraps a field in quotes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Quote only fields that would otherwise be misread
    #[default]
    Normal,
    /// Quote every field
    Always,
    /// Always quote the listed 1-based columns, other columns behave as `Normal`
    Columns(BTreeSet<usize>),
}

impl QuoteMode {
    pub fn columns(columns: impl IntoIterator<Item = usize>) -> Self {
        QuoteMode::Columns(columns.into_iter().collect())
    }

    /// Whether a column must be quoted regardless of its content
    pub fn forces_quote(&self, column_number: usize) -> bool {
        match self {
            QuoteMode::Normal => false,
            QuoteMode::Always => true,
            QuoteMode::Columns(columns) => columns.contains(&column_number),
        }
    }
}

/// Syntactic conventions of one CSV variant
#[derive(Debug, Clone)]
pub struct Dialect {
    quote_char: char,
    delimiter: char,
    end_of_line: String,
    surrounding_spaces_need_quotes: bool,
    ignore_empty_lines: bool,
    max_lines_per_row: Option<usize>,
    comment_matcher: Option<CommentMatcher>,
    quote_mode: QuoteMode,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::standard()
    }
}

impl Dialect {
    /// RFC 4180 style: `"` quotes, `,` delimiter, `\r\n` line endings
    pub fn standard() -> Self {
        Self::preset('"', ',', "\r\n")
    }

    /// Spreadsheet export: `"` quotes, `,` delimiter, `\n` line endings
    pub fn excel() -> Self {
        Self::preset('"', ',', "\n")
    }

    /// Spreadsheet export for locales using the comma as decimal separator
    pub fn excel_north_europe() -> Self {
        Self::preset('"', ';', "\n")
    }

    /// Tab separated values
    pub fn tab() -> Self {
        Self::preset('"', '\t', "\n")
    }

    fn preset(quote_char: char, delimiter: char, end_of_line: &str) -> Self {
        Self {
            quote_char,
            delimiter,
            end_of_line: end_of_line.to_string(),
            surrounding_spaces_need_quotes: false,
            ignore_empty_lines: true,
            max_lines_per_row: None,
            comment_matcher: None,
            quote_mode: QuoteMode::Normal,
        }
    }

    /// Start a custom dialect
    pub fn builder(quote_char: char, delimiter: char, end_of_line: &str) -> DialectBuilder {
        DialectBuilder {
            dialect: Self::preset(quote_char, delimiter, end_of_line),
        }
    }

    /// Derive a new dialect from this one
    pub fn to_builder(&self) -> DialectBuilder {
        DialectBuilder {
            dialect: self.clone(),
        }
    }

    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn end_of_line(&self) -> &str {
        &self.end_of_line
    }

    /// Whether spaces around a field are insignificant unless quoted
    pub fn surrounding_spaces_need_quotes(&self) -> bool {
        self.surrounding_spaces_need_quotes
    }

    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    pub fn max_lines_per_row(&self) -> Option<usize> {
        self.max_lines_per_row
    }

    pub fn comment_matcher(&self) -> Option<&CommentMatcher> {
        self.comment_matcher.as_ref()
    }

    pub fn quote_mode(&self) -> &QuoteMode {
        &self.quote_mode
    }

    /// Whether a physical line is a comment
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_comment(line))
    }
}

/// Builder for custom dialects
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.dialect.quote_char = quote_char;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.dialect.delimiter = delimiter;
        self
    }

    pub fn with_end_of_line(mut self, end_of_line: &str) -> Self {
        self.dialect.end_of_line = end_of_line.to_string();
        self
    }

    pub fn with_surrounding_spaces_need_quotes(mut self, enabled: bool) -> Self {
        self.dialect.surrounding_spaces_need_quotes = enabled;
        self
    }

    pub fn with_ignore_empty_lines(mut self, enabled: bool) -> Self {
        self.dialect.ignore_empty_lines = enabled;
        self
    }

    /// Bound the number of physical lines one record may span
    pub fn with_max_lines_per_row(mut self, max: usize) -> Self {
        self.dialect.max_lines_per_row = Some(max);
        self
    }

    pub fn with_comment_matcher(mut self, matcher: CommentMatcher) -> Self {
        self.dialect.comment_matcher = Some(matcher);
        self
    }

    pub fn with_quote_mode(mut self, quote_mode: QuoteMode) -> Self {
        self.dialect.quote_mode = quote_mode;
        self
    }

    pub fn build(self) -> CsvResult<Dialect> {
        let d = self.dialect;
        if d.quote_char == d.delimiter {
            return Err(CsvError::configuration(format!(
                "quote character and delimiter must differ (both '{}')",
                d.quote_char.escape_default()
            )));
        }
        for (name, ch) in [("quote character", d.quote_char), ("delimiter", d.delimiter)] {
            if ch == '\r' || ch == '\n' {
                return Err(CsvError::configuration(format!(
                    "{} cannot be a line break",
                    name
                )));
            }
        }
        if !matches!(d.end_of_line.as_str(), "\n" | "\r\n" | "\r") {
            return Err(CsvError::configuration(format!(
                "unsupported end of line '{}'",
                d.end_of_line.escape_default()
            )));
        }
        if let Some(CommentMatcher::StartsWith(prefix)) = &d.comment_matcher {
            if prefix.starts_with(d.quote_char) {
                return Err(CsvError::configuration(format!(
                    "comment prefix '{}' cannot start with the quote character, quoted fields would read as comments",
                    prefix.escape_default()
                )));
            }
        }
        if d.max_lines_per_row == Some(0) {
            return Err(CsvError::configuration(
                "max lines per row must be greater than zero",
            ));
        }
        Ok(d)
    }
}
