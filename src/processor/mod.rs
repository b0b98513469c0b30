//! Cell processors and the chain executor
//!
//! A [`Chain`] is an ordered list of [`CellProcessor`]s applied to one column.
//! Each processor receives the current value and the read-only
//! [`CsvContext`], and either forwards a value to the next processor
//! ([`Flow::Next`]) or ends the chain ([`Flow::Done`]).
//!
//! ```
//! use csvpipe::processor::{execute_chains, Chain, CellValue, LMinMax, NotNull, ParseInt};
//! use csvpipe::CsvContext;
//!
//! let mut chains = vec![
//!     None,
//!     Some(Chain::new().then(NotNull).then(ParseInt).then(LMinMax::new(0, 150).unwrap())),
//! ];
//! let raw = vec!["alice".to_string(), "42".to_string()];
//! let mut ctx = CsvContext::new(1, 1, 0);
//! let row = execute_chains(&raw, &mut chains, &mut ctx).unwrap();
//! assert_eq!(row, vec![CellValue::from("alice"), CellValue::Int(42)]);
//! ```

pub mod constraints;
pub mod nulls;
pub mod parse;
pub mod transform;
pub mod unique;
pub mod value;

pub use constraints::{
    DMinMax, Equals, ForbidSubStr, IsIncludedIn, LMinMax, RequireSubStr, StrMinMax, StrRegEx,
    Strlen,
};
pub use nulls::{ConvertNullTo, NotNull, Optional, StrNotNullOrEmpty};
pub use parse::{ParseBool, ParseChar, ParseDate, ParseDateTime, ParseDouble, ParseInt};
pub use transform::{FmtBool, FmtDate, FmtNumber, HashMapper, StrReplace, Token, Trim, Truncate};
pub use unique::{Unique, UniqueHashCode};
pub use value::CellValue;

use crate::context::CsvContext;
use crate::error::{CsvError, CsvResult};
use std::fmt;

/// What a processor hands back to the chain
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Forward the value to the next processor
    Next(CellValue),
    /// Stop the chain, this is the column's final value
    Done(CellValue),
}

impl Flow {
    pub fn into_value(self) -> CellValue {
        match self {
            Flow::Next(value) | Flow::Done(value) => value,
        }
    }
}

/// One validation or transformation step
pub trait CellProcessor {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow>;
}

impl<F> CellProcessor for F
where
    F: FnMut(CellValue, &CsvContext) -> CsvResult<CellValue>,
{
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        self(value, context).map(Flow::Next)
    }
}

/// Ordered processors for one column
#[derive(Default)]
pub struct Chain {
    processors: Vec<Box<dyn CellProcessor>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor to the end of the chain
    pub fn then<P: CellProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run the chain on one value. An empty chain is the identity.
    pub fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<CellValue> {
        let mut current = value;
        for processor in self.processors.iter_mut() {
            match processor.execute(current, context)? {
                Flow::Next(value) => current = value,
                Flow::Done(value) => return Ok(value),
            }
        }
        Ok(current)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("processors", &self.processors.len())
            .finish()
    }
}

/// Apply one chain per column to a raw row.
///
/// The number of chains must equal the number of columns; a mismatch fails
/// before any processor runs. A `None` chain keeps the raw string. The
/// context's column number is updated as each column is processed and the
/// first failure abandons the row.
pub fn execute_chains(
    raw_row: &[String],
    chains: &mut [Option<Chain>],
    context: &mut CsvContext,
) -> CsvResult<Vec<CellValue>> {
    let values = raw_row.iter().cloned().map(CellValue::Str).collect();
    execute_value_chains(values, chains, context)
}

/// Same as [`execute_chains`] for values that are already typed, as on the
/// writer side.
pub fn execute_value_chains(
    values: Vec<CellValue>,
    chains: &mut [Option<Chain>],
    context: &mut CsvContext,
) -> CsvResult<Vec<CellValue>> {
    if values.len() != chains.len() {
        return Err(CsvError::configuration(format!(
            "the number of columns to be processed ({}) must match the number of cell processors ({}) at {}",
            values.len(),
            chains.len(),
            context
        )));
    }

    let mut row = Vec::with_capacity(values.len());
    for (index, (value, chain)) in values.into_iter().zip(chains.iter_mut()).enumerate() {
        context.column_number = index + 1;
        let processed = match chain {
            Some(chain) => chain
                .execute(value, context)
                .map_err(|e| e.with_context(context))?,
            None => value,
        };
        row.push(processed);
    }
    Ok(row)
}

/// Borrow the string inside a value or fail with a processing error
pub(crate) fn require_str<'a>(
    value: &'a CellValue,
    context: &CsvContext,
    processor: &str,
) -> CsvResult<&'a str> {
    value.as_str().ok_or_else(|| {
        CsvError::processing(
            format!(
                "{} expects a string input but received {} '{}'",
                processor,
                value.type_name(),
                value
            ),
            context,
        )
    })
}

/// Fail when a processor that needs input meets a null value
pub(crate) fn reject_null(value: &CellValue, context: &CsvContext, processor: &str) -> CsvResult<()> {
    if matches!(value, CellValue::Null) {
        return Err(CsvError::processing(
            format!(
                "{} received a null value; guard the column with Optional or NotNull",
                processor
            ),
            context,
        ));
    }
    Ok(())
}
