//! Writer side: field escaping and record output

pub mod encoder;
pub mod writer;

pub use encoder::CsvEncoder;
pub use writer::CsvListWriter;

use crate::dialect::Dialect;

/// Format rows as delimited text in memory, one line terminator per record
pub fn format_rows<S: AsRef<str>>(rows: &[Vec<S>], dialect: &Dialect) -> String {
    let encoder = CsvEncoder::new(dialect.clone());
    let mut output = String::new();
    for row in rows {
        output.push_str(&encoder.encode_row(row));
        output.push_str(dialect.end_of_line());
    }
    output
}
