//! Error types for tokenizing, processing and writing delimited text

use crate::context::CsvContext;
use crate::processor::CellValue;
use std::fmt;

/// Main error type for reader and writer operations
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// Malformed input: unterminated quote, stray character, line bound exceeded
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A cell value failed a validation rule
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),

    /// A processor hit an unexpected condition, such as an input of the wrong type
    #[error("Processing error: {message}")]
    Processing {
        message: String,
        context: Option<CsvContext>,
    },

    /// Chain/column mismatch, unknown column name or invalid arguments
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CsvError {
    pub fn parse(message: impl Into<String>, line_number: usize, row_number: usize) -> Self {
        Self::Parse(ParseError::new(message, line_number, row_number))
    }

    pub fn constraint(message: impl Into<String>, value: CellValue, context: &CsvContext) -> Self {
        Self::Constraint(ConstraintViolation::new(message, value, context.clone()))
    }

    pub fn processing(message: impl Into<String>, context: &CsvContext) -> Self {
        Self::Processing {
            message: message.into(),
            context: Some(context.clone()),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Context snapshot taken when the failure occurred
    pub fn context(&self) -> Option<&CsvContext> {
        match self {
            Self::Constraint(err) => Some(&err.context),
            Self::Processing { context, .. } => context.as_ref(),
            _ => None,
        }
    }

    /// Attach a context to a processing failure that was raised without one
    pub fn with_context(self, ctx: &CsvContext) -> Self {
        match self {
            Self::Processing {
                message,
                context: None,
            } => Self::Processing {
                message,
                context: Some(ctx.clone()),
            },
            other => other,
        }
    }

    /// Whether the stream can still be read after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Constraint(_) | Self::Processing { .. })
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(err) => format!("Malformed CSV: {}", err),
            Self::Constraint(err) => format!(
                "Row {} column {} rejected: {}",
                err.context.row_number, err.context.column_number, err
            ),
            Self::Processing {
                message,
                context: Some(ctx),
            } => format!("Processing failed at {}: {}", ctx, message),
            Self::Processing { message, .. } => format!("Processing failed: {}", message),
            Self::Io(err) => format!("I/O failure: {}", err),
            Self::Other(err) => format!("Unexpected error: {}", err),
            _ => self.to_string(),
        }
    }
}

/// Malformed input detected by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line_number: usize,
    pub row_number: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line_number: usize, row_number: usize) -> Self {
        Self {
            message: message.into(),
            line_number,
            row_number,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {} (row {})",
            self.message, self.line_number, self.row_number
        )
    }
}

impl std::error::Error for ParseError {}

/// A cell value that broke a processor's constraint
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    pub message: String,
    pub value: CellValue,
    pub context: CsvContext,
}

impl ConstraintViolation {
    pub fn new(message: impl Into<String>, value: CellValue, context: CsvContext) -> Self {
        Self {
            message: message.into(),
            value,
            context,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (value '{}', {})", self.message, self.value, self.context)
    }
}

impl std::error::Error for ConstraintViolation {}

/// Result type for reader, writer and processor operations
pub type CsvResult<T> = Result<T, CsvError>;

/// Convenience result type for tokenizing operations
pub type ParseResult<T> = Result<T, ParseError>;
