//! Processors converting raw strings into typed values
//!
//! A string that does not parse is a constraint violation; an input that is
//! not a string at all (and not already the target type) is a processing
//! error.

use super::{reject_null, require_str, CellProcessor, CellValue, Flow};
use crate::context::CsvContext;
use crate::error::{CsvError, CsvResult};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

/// Parses a 64-bit signed integer
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseInt;

impl CellProcessor for ParseInt {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ParseInt")?;
        if let CellValue::Int(_) = value {
            return Ok(Flow::Next(value));
        }
        let parsed = require_str(&value, context, "ParseInt")?.parse::<i64>();
        match parsed {
            Ok(i) => Ok(Flow::Next(CellValue::Int(i))),
            Err(e) => Err(CsvError::constraint(
                format!("'{}' could not be parsed as an integer: {}", value, e),
                value,
                context,
            )),
        }
    }
}

/// Parses a double precision float
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseDouble;

impl CellProcessor for ParseDouble {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ParseDouble")?;
        match value {
            CellValue::Float(_) => return Ok(Flow::Next(value)),
            CellValue::Int(i) => return Ok(Flow::Next(CellValue::Float(i as f64))),
            _ => {}
        }
        let parsed = require_str(&value, context, "ParseDouble")?.parse::<f64>();
        match parsed {
            Ok(f) => Ok(Flow::Next(CellValue::Float(f))),
            Err(e) => Err(CsvError::constraint(
                format!("'{}' could not be parsed as a double: {}", value, e),
                value,
                context,
            )),
        }
    }
}

/// Parses a boolean from configurable spellings
#[derive(Debug, Clone)]
pub struct ParseBool {
    true_values: HashSet<String>,
    false_values: HashSet<String>,
    ignore_case: bool,
}

impl Default for ParseBool {
    fn default() -> Self {
        Self {
            true_values: ["true", "1", "y", "t", "yes"].iter().map(|s| s.to_string()).collect(),
            false_values: ["false", "0", "n", "f", "no"].iter().map(|s| s.to_string()).collect(),
            ignore_case: true,
        }
    }
}

impl ParseBool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom spellings. Both sets must be non-empty and disjoint.
    pub fn with_values<T, F>(true_values: T, false_values: F) -> CsvResult<Self>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let true_values: HashSet<String> = true_values.into_iter().map(Into::into).collect();
        let false_values: HashSet<String> = false_values.into_iter().map(Into::into).collect();
        if true_values.is_empty() || false_values.is_empty() {
            return Err(CsvError::configuration(
                "ParseBool needs at least one true and one false value",
            ));
        }
        if let Some(both) = true_values.intersection(&false_values).next() {
            return Err(CsvError::configuration(format!(
                "ParseBool value '{}' cannot mean both true and false",
                both
            )));
        }
        Ok(Self {
            true_values,
            false_values,
            ignore_case: true,
        })
    }

    /// Match spellings exactly instead of ignoring case
    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    fn contains(&self, set: &HashSet<String>, input: &str) -> bool {
        if self.ignore_case {
            set.iter().any(|candidate| candidate.eq_ignore_ascii_case(input))
        } else {
            set.contains(input)
        }
    }
}

impl CellProcessor for ParseBool {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ParseBool")?;
        if let CellValue::Bool(_) = value {
            return Ok(Flow::Next(value));
        }
        let input = require_str(&value, context, "ParseBool")?;
        if self.contains(&self.true_values, input) {
            Ok(Flow::Next(CellValue::Bool(true)))
        } else if self.contains(&self.false_values, input) {
            Ok(Flow::Next(CellValue::Bool(false)))
        } else {
            Err(CsvError::constraint(
                format!("'{}' could not be parsed as a boolean", input),
                value,
                context,
            ))
        }
    }
}

/// Parses a single character
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseChar;

impl CellProcessor for ParseChar {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ParseChar")?;
        if let CellValue::Char(_) = value {
            return Ok(Flow::Next(value));
        }
        let input = require_str(&value, context, "ParseChar")?;
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Flow::Next(CellValue::Char(c))),
            _ => Err(CsvError::constraint(
                format!("'{}' cannot be parsed as a char as it is a string longer than 1 character", input),
                value,
                context,
            )),
        }
    }
}

fn validate_format(format: &str, processor: &str) -> CsvResult<String> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(CsvError::configuration(format!(
            "{} has an invalid date format '{}'",
            processor, format
        )));
    }
    Ok(format.to_string())
}

/// Parses a calendar date using a strftime-style format
#[derive(Debug, Clone)]
pub struct ParseDate {
    format: String,
}

impl ParseDate {
    pub fn new(format: &str) -> CsvResult<Self> {
        Ok(Self {
            format: validate_format(format, "ParseDate")?,
        })
    }
}

impl CellProcessor for ParseDate {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ParseDate")?;
        if let CellValue::Date(_) = value {
            return Ok(Flow::Next(value));
        }
        let parsed = NaiveDate::parse_from_str(require_str(&value, context, "ParseDate")?, &self.format);
        match parsed {
            Ok(date) => Ok(Flow::Next(CellValue::Date(date))),
            Err(e) => Err(CsvError::constraint(
                format!("'{}' could not be parsed as a date with format '{}': {}", value, self.format, e),
                value,
                context,
            )),
        }
    }
}

/// Parses a date and time using a strftime-style format
#[derive(Debug, Clone)]
pub struct ParseDateTime {
    format: String,
}

impl ParseDateTime {
    pub fn new(format: &str) -> CsvResult<Self> {
        Ok(Self {
            format: validate_format(format, "ParseDateTime")?,
        })
    }
}

impl CellProcessor for ParseDateTime {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ParseDateTime")?;
        if let CellValue::DateTime(_) = value {
            return Ok(Flow::Next(value));
        }
        let parsed = NaiveDateTime::parse_from_str(
            require_str(&value, context, "ParseDateTime")?,
            &self.format,
        );
        match parsed {
            Ok(dt) => Ok(Flow::Next(CellValue::DateTime(dt))),
            Err(e) => Err(CsvError::constraint(
                format!("'{}' could not be parsed as a datetime with format '{}': {}", value, self.format, e),
                value,
                context,
            )),
        }
    }
}
