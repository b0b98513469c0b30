//! Transforming processors, mostly used on the writer side

use super::{reject_null, require_str, CellProcessor, CellValue, Flow};
use crate::context::CsvContext;
use crate::error::{CsvError, CsvResult};
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use std::collections::HashMap;

/// Removes leading and trailing whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl CellProcessor for Trim {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "Trim")?;
        let trimmed = require_str(&value, context, "Trim")?.trim().to_string();
        Ok(Flow::Next(CellValue::Str(trimmed)))
    }
}

/// Cuts the string form down to `max_chars` characters, appending a suffix when cut
#[derive(Debug, Clone)]
pub struct Truncate {
    max_chars: usize,
    suffix: String,
}

impl Truncate {
    pub fn new(max_chars: usize) -> CsvResult<Self> {
        Self::with_suffix(max_chars, "")
    }

    pub fn with_suffix(max_chars: usize, suffix: &str) -> CsvResult<Self> {
        if max_chars == 0 {
            return Err(CsvError::configuration("Truncate max length must be greater than zero"));
        }
        Ok(Self {
            max_chars,
            suffix: suffix.to_string(),
        })
    }
}

impl CellProcessor for Truncate {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "Truncate")?;
        let text = value.to_string();
        if text.chars().count() <= self.max_chars {
            return Ok(Flow::Next(CellValue::Str(text)));
        }
        let mut cut: String = text.chars().take(self.max_chars).collect();
        cut.push_str(&self.suffix);
        Ok(Flow::Next(CellValue::Str(cut)))
    }
}

/// Replaces every match of a regular expression
#[derive(Debug, Clone)]
pub struct StrReplace {
    regex: Regex,
    replacement: String,
}

impl StrReplace {
    pub fn new(pattern: &str, replacement: &str) -> CsvResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| CsvError::configuration(format!("StrReplace pattern is invalid: {}", e)))?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }
}

impl CellProcessor for StrReplace {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "StrReplace")?;
        let text = value.to_string();
        let replaced = self.regex.replace_all(&text, self.replacement.as_str());
        Ok(Flow::Next(CellValue::Str(replaced.into_owned())))
    }
}

/// Ends the chain with a replacement when the value equals a token
#[derive(Debug, Clone)]
pub struct Token {
    token: CellValue,
    replacement: CellValue,
}

impl Token {
    pub fn new(token: impl Into<CellValue>, replacement: impl Into<CellValue>) -> Self {
        Self {
            token: token.into(),
            replacement: replacement.into(),
        }
    }
}

impl CellProcessor for Token {
    fn execute(&mut self, value: CellValue, _context: &CsvContext) -> CsvResult<Flow> {
        if value == self.token {
            Ok(Flow::Done(self.replacement.clone()))
        } else {
            Ok(Flow::Next(value))
        }
    }
}

/// Looks the value up in a map; unmapped values become the default (or `Null`)
#[derive(Debug, Clone)]
pub struct HashMapper {
    mapping: HashMap<CellValue, CellValue>,
    default: CellValue,
}

impl HashMapper {
    pub fn new<I, K, V>(mapping: I) -> CsvResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CellValue>,
        V: Into<CellValue>,
    {
        let mapping: HashMap<CellValue, CellValue> = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if mapping.is_empty() {
            return Err(CsvError::configuration("HashMapper mapping should not be empty"));
        }
        Ok(Self {
            mapping,
            default: CellValue::Null,
        })
    }

    pub fn with_default(mut self, default: impl Into<CellValue>) -> Self {
        self.default = default.into();
        self
    }
}

impl CellProcessor for HashMapper {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "HashMapper")?;
        let mapped = self
            .mapping
            .get(&value)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        Ok(Flow::Next(mapped))
    }
}

/// Formats a boolean with custom spellings
#[derive(Debug, Clone)]
pub struct FmtBool {
    true_value: String,
    false_value: String,
}

impl FmtBool {
    pub fn new(true_value: &str, false_value: &str) -> Self {
        Self {
            true_value: true_value.to_string(),
            false_value: false_value.to_string(),
        }
    }
}

impl CellProcessor for FmtBool {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "FmtBool")?;
        match value.as_bool() {
            Some(true) => Ok(Flow::Next(CellValue::Str(self.true_value.clone()))),
            Some(false) => Ok(Flow::Next(CellValue::Str(self.false_value.clone()))),
            None => Err(CsvError::processing(
                format!("FmtBool expects a boolean but received {}", value.type_name()),
                context,
            )),
        }
    }
}

/// Formats a number with a fixed count of decimal places
#[derive(Debug, Clone, Copy)]
pub struct FmtNumber {
    decimals: usize,
}

impl FmtNumber {
    pub fn new(decimals: usize) -> Self {
        Self { decimals }
    }
}

impl CellProcessor for FmtNumber {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "FmtNumber")?;
        match value.as_float() {
            Some(number) => Ok(Flow::Next(CellValue::Str(format!(
                "{:.*}",
                self.decimals, number
            )))),
            None => Err(CsvError::processing(
                format!("FmtNumber expects a number but received {}", value.type_name()),
                context,
            )),
        }
    }
}

/// Formats a date or date-time with a strftime-style format
#[derive(Debug, Clone)]
pub struct FmtDate {
    format: String,
}

impl FmtDate {
    pub fn new(format: &str) -> CsvResult<Self> {
        if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(CsvError::configuration(format!(
                "FmtDate has an invalid date format '{}'",
                format
            )));
        }
        Ok(Self {
            format: format.to_string(),
        })
    }
}

impl CellProcessor for FmtDate {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "FmtDate")?;
        let formatted = match &value {
            CellValue::Date(date) => date.format(&self.format).to_string(),
            CellValue::DateTime(dt) => dt.format(&self.format).to_string(),
            other => {
                return Err(CsvError::processing(
                    format!("FmtDate expects a date but received {}", other.type_name()),
                    context,
                ))
            }
        };
        Ok(Flow::Next(CellValue::Str(formatted)))
    }
}
