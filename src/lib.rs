//! Dialect-aware CSV reading and writing
//!
//! A character-level tokenizer splits delimited text into records, handling
//! quoted fields that span several physical lines. Each column of a record
//! can be run through a chain of cell processors that convert, validate or
//! reformat it. The writer escapes fields so that reading its output with
//! the same dialect yields the records that were written.
//!
//! ```
//! use csvpipe::{CsvListReader, Dialect};
//!
//! let input = "id,note\n1,\"two\nlines\"\n";
//! let mut reader = CsvListReader::new(input.as_bytes(), Dialect::excel());
//! reader.header(true).unwrap();
//! let row = reader.read().unwrap().unwrap();
//! assert_eq!(row, vec!["1", "two\nlines"]);
//! assert_eq!(reader.line_number(), 3);
//! ```

pub mod cli;
pub mod context;
pub mod dialect;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod processor;

// Re-export commonly used types
pub use context::CsvContext;
pub use dialect::{CommentMatcher, Dialect, DialectBuilder, QuoteMode};
pub use error::{ConstraintViolation, CsvError, CsvResult, ParseError};
pub use formatter::{CsvEncoder, CsvListWriter};
pub use parser::{ColumnMapping, CsvListReader, Tokenizer};
pub use processor::{CellProcessor, CellValue, Chain, Flow};
