//! Command-line interface module

pub mod stats;

pub use stats::RunStatistics;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use crate::dialect::{CommentMatcher, DelimiterType, Dialect, QuoteMode};
use crate::error::CsvError;
use crate::formatter::CsvListWriter;
use crate::parser::CsvListReader;
use crate::processor::{CellValue, Chain, NotNull, Optional, ParseInt, Unique};

/// Main CLI arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "csvpipe")]
#[command(about = "Read, check and rewrite delimited text (CSV and CSV-like dialects)")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
pub struct Args {
    /// Input file (default: standard input)
    #[arg()]
    pub input: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input delimiter: comma, tab, pipe or semicolon (default: comma)
    #[arg(long)]
    pub delimiter: Option<Delimiter>,

    /// Input and output quote character (default: ")
    #[arg(long)]
    pub quote: Option<char>,

    /// Emit empty input lines as single empty-field rows instead of skipping them
    #[arg(long)]
    pub keep_empty_lines: bool,

    /// Treat unquoted spaces around fields as insignificant
    #[arg(long)]
    pub trim_spaces: bool,

    /// Fail when one record spans more physical lines than this
    #[arg(long)]
    pub max_lines_per_row: Option<usize>,

    /// Skip input lines starting with this prefix
    #[arg(long)]
    pub comment: Option<String>,

    /// Output delimiter (default: same as input)
    #[arg(long)]
    pub out_delimiter: Option<Delimiter>,

    /// Quote every output field
    #[arg(long)]
    pub always_quote: bool,

    /// Terminate output lines with \r\n
    #[arg(long)]
    pub crlf: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Treat the first record as a header
    #[arg(long)]
    pub header: bool,

    /// Reject rows where this column is empty (needs --header)
    #[arg(long = "not-null", value_name = "COLUMN")]
    pub not_null: Vec<String>,

    /// Reject rows repeating a value of this column (needs --header)
    #[arg(long = "unique", value_name = "COLUMN")]
    pub unique: Vec<String>,

    /// Parse this column as an integer (needs --header)
    #[arg(long = "int", value_name = "COLUMN")]
    pub int: Vec<String>,

    /// Skip rows that fail a column check instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,

    /// Output run statistics on stderr
    #[arg(long)]
    pub stats: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,
}

/// Delimiter types for CLI
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Delimiter {
    #[value(name = "comma", alias = ",")]
    Comma,
    #[value(name = "tab", alias = "\t")]
    Tab,
    #[value(name = "pipe", alias = "|")]
    Pipe,
    #[value(name = "semicolon", alias = ";")]
    Semicolon,
}

impl From<Delimiter> for DelimiterType {
    fn from(delimiter: Delimiter) -> Self {
        match delimiter {
            Delimiter::Comma => DelimiterType::Comma,
            Delimiter::Tab => DelimiterType::Tab,
            Delimiter::Pipe => DelimiterType::Pipe,
            Delimiter::Semicolon => DelimiterType::Semicolon,
        }
    }
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Delimited text in the output dialect
    #[default]
    Csv,
    /// One JSON value per record (objects when --header is set)
    Json,
}

impl Args {
    /// Dialect used to read the input
    pub fn input_dialect(&self) -> Result<Dialect> {
        let delimiter = DelimiterType::from(self.delimiter.unwrap_or(Delimiter::Comma));
        let mut builder = Dialect::builder(self.quote.unwrap_or('"'), delimiter.as_char(), "\n")
            .with_ignore_empty_lines(!self.keep_empty_lines)
            .with_surrounding_spaces_need_quotes(self.trim_spaces);
        if let Some(max) = self.max_lines_per_row {
            builder = builder.with_max_lines_per_row(max);
        }
        if let Some(prefix) = &self.comment {
            builder = builder.with_comment_matcher(CommentMatcher::starts_with(prefix.as_str())?);
        }
        Ok(builder.build()?)
    }

    /// Dialect used to write CSV output
    pub fn output_dialect(&self, input: &Dialect) -> Result<Dialect> {
        let mut builder = input.to_builder().with_end_of_line(if self.crlf { "\r\n" } else { "\n" });
        if let Some(delimiter) = self.out_delimiter {
            builder = builder.with_delimiter(DelimiterType::from(delimiter).as_char());
        }
        if self.always_quote {
            builder = builder.with_quote_mode(QuoteMode::Always);
        }
        Ok(builder.build()?)
    }

    fn has_checks(&self) -> bool {
        !(self.not_null.is_empty() && self.unique.is_empty() && self.int.is_empty())
    }

    /// Get input source description
    pub fn input_description(&self) -> String {
        match &self.input {
            Some(path) => format!("'{}'", path.display()),
            None => "standard input".to_string(),
        }
    }
}

/// Build one chain per header column from the column check flags
pub fn build_chains(args: &Args, header: &[String]) -> Result<Vec<Option<Chain>>> {
    let known: HashSet<&str> = header.iter().map(String::as_str).collect();
    for name in args.not_null.iter().chain(&args.unique).chain(&args.int) {
        if !known.contains(name.as_str()) {
            bail!("column '{}' is not present in the header {:?}", name, header);
        }
    }

    let chains = header
        .iter()
        .map(|column| {
            let not_null = args.not_null.contains(column);
            let int = args.int.contains(column);
            let unique = args.unique.contains(column);
            if !(not_null || int || unique) {
                return None;
            }

            let mut chain = Chain::new();
            if not_null {
                chain = chain.then(NotNull);
            } else if int {
                chain = chain.then(Optional);
            }
            if int {
                chain = chain.then(ParseInt);
            }
            if unique {
                chain = chain.then(Unique::new());
            }
            Some(chain)
        })
        .collect();
    Ok(chains)
}

enum Sink {
    Csv(CsvListWriter<Box<dyn Write>>),
    Json(Box<dyn Write>),
}

impl Sink {
    fn header(&mut self, header: &[String]) -> Result<()> {
        if let Sink::Csv(writer) = self {
            writer.write_header(header)?;
        }
        Ok(())
    }

    fn row(&mut self, header: Option<&[String]>, values: &[CellValue]) -> Result<()> {
        match self {
            Sink::Csv(writer) => {
                let fields: Vec<String> = values.iter().map(ToString::to_string).collect();
                writer.write(&fields)?;
            }
            Sink::Json(out) => {
                let line = match header {
                    Some(header) => {
                        let object: serde_json::Map<String, serde_json::Value> = header
                            .iter()
                            .zip(values)
                            .map(|(name, value)| serde_json::to_value(value).map(|v| (name.clone(), v)))
                            .collect::<Result<_, serde_json::Error>>()?;
                        serde_json::to_string(&object)?
                    }
                    None => serde_json::to_string(values)?,
                };
                writeln!(out, "{}", line)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        match self {
            Sink::Csv(writer) => {
                writer.into_inner()?;
            }
            Sink::Json(mut out) => out.flush()?,
        }
        Ok(())
    }
}

/// Copy every record from the input to the output, applying column checks
pub fn run(args: &Args) -> Result<RunStatistics> {
    let start = Instant::now();
    let input_dialect = args.input_dialect()?;
    let output_dialect = args.output_dialect(&input_dialect)?;

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut reader = CsvListReader::new(input, input_dialect);
    let mut sink = match args.format {
        OutputFormat::Csv => Sink::Csv(CsvListWriter::new(output, output_dialect)),
        OutputFormat::Json => Sink::Json(output),
    };
    let mut stats = RunStatistics::new();

    let header = if args.header {
        let header = reader
            .header(true)?
            .ok_or_else(|| anyhow!("{} is empty, expected a header row", args.input_description()))?;
        sink.header(&header)?;
        Some(header)
    } else {
        if args.has_checks() {
            bail!("column checks need --header to resolve column names");
        }
        None
    };

    let mut chains = match &header {
        Some(header) if args.has_checks() => Some(build_chains(args, header)?),
        _ => None,
    };

    while let Some(row) = reader.read()? {
        stats.rows_read += 1;
        let values = match chains.as_mut() {
            Some(chains) => match reader.execute_processors(chains) {
                Ok(values) => values,
                Err(e) if args.continue_on_error => {
                    stats.rows_rejected += 1;
                    if !args.quiet {
                        eprintln!("⚠ Skipping row: {}", e.user_message());
                    }
                    continue;
                }
                Err(e) => return Err(e.into()),
            },
            None => row.into_iter().map(CellValue::Str).collect(),
        };
        sink.row(header.as_deref(), &values)?;
        stats.rows_written += 1;
    }

    sink.finish()?;
    stats.finish(reader.line_number(), start.elapsed());
    Ok(stats)
}

/// Show a success message (if not in quiet mode)
pub fn show_success(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("✓ {}", message);
    }
}

/// Handle CLI errors with user-friendly messages
pub fn handle_error(error: &anyhow::Error) {
    let Some(csv_error) = error.downcast_ref::<CsvError>() else {
        eprintln!("✗ {:#}", error);
        eprintln!("\nTry 'csvpipe --help' for usage information.");
        return;
    };

    eprintln!("✗ {}", csv_error.user_message());
    match csv_error {
        CsvError::Parse(_) => {
            eprintln!("\nTip: Check for an unbalanced quote near the reported line, or use --max-lines-per-row to fail sooner");
        }
        CsvError::Constraint(_) => {
            eprintln!("\nTip: Use --continue-on-error to skip rows that fail a column check");
        }
        _ => {}
    }

    eprintln!("\nTry 'csvpipe --help' for usage information.");
}
