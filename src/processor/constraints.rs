//! Validating processors that forward the value unchanged when it passes

use super::{reject_null, CellProcessor, CellValue, Flow};
use crate::context::CsvContext;
use crate::error::{CsvError, CsvResult};
use regex::Regex;
use std::collections::HashSet;

/// Integer within an inclusive range; string input is parsed first
#[derive(Debug, Clone, Copy)]
pub struct LMinMax {
    min: i64,
    max: i64,
}

impl LMinMax {
    pub fn new(min: i64, max: i64) -> CsvResult<Self> {
        if max < min {
            return Err(CsvError::configuration(format!(
                "LMinMax max ({}) should not be less than min ({})",
                max, min
            )));
        }
        Ok(Self { min, max })
    }
}

impl CellProcessor for LMinMax {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "LMinMax")?;
        let number = match &value {
            CellValue::Int(i) => *i,
            CellValue::Str(s) => match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => {
                    return Err(CsvError::constraint(
                        format!("'{}' could not be parsed as an integer", s),
                        value,
                        context,
                    ))
                }
            },
            other => {
                return Err(CsvError::processing(
                    format!("LMinMax expects an integer but received {}", other.type_name()),
                    context,
                ))
            }
        };
        if number < self.min || number > self.max {
            return Err(CsvError::constraint(
                format!(
                    "{} does not lie between the min ({}) and max ({}) values (inclusive)",
                    number, self.min, self.max
                ),
                value,
                context,
            ));
        }
        Ok(Flow::Next(CellValue::Int(number)))
    }
}

/// Float within an inclusive range; integers and strings are converted first
#[derive(Debug, Clone, Copy)]
pub struct DMinMax {
    min: f64,
    max: f64,
}

impl DMinMax {
    pub fn new(min: f64, max: f64) -> CsvResult<Self> {
        if max.is_nan() || min.is_nan() || max < min {
            return Err(CsvError::configuration(format!(
                "DMinMax max ({}) should not be less than min ({})",
                max, min
            )));
        }
        Ok(Self { min, max })
    }
}

impl CellProcessor for DMinMax {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "DMinMax")?;
        let number = match &value {
            CellValue::Float(f) => *f,
            CellValue::Int(i) => *i as f64,
            CellValue::Str(s) => match s.parse::<f64>() {
                Ok(f) => f,
                Err(_) => {
                    return Err(CsvError::constraint(
                        format!("'{}' could not be parsed as a double", s),
                        value,
                        context,
                    ))
                }
            },
            other => {
                return Err(CsvError::processing(
                    format!("DMinMax expects a number but received {}", other.type_name()),
                    context,
                ))
            }
        };
        if !(number >= self.min && number <= self.max) {
            return Err(CsvError::constraint(
                format!(
                    "{} does not lie between the min ({}) and max ({}) values (inclusive)",
                    number, self.min, self.max
                ),
                value,
                context,
            ));
        }
        Ok(Flow::Next(CellValue::Float(number)))
    }
}

/// String length (in characters) within an inclusive range
#[derive(Debug, Clone, Copy)]
pub struct StrMinMax {
    min: usize,
    max: usize,
}

impl StrMinMax {
    pub fn new(min: usize, max: usize) -> CsvResult<Self> {
        if max < min {
            return Err(CsvError::configuration(format!(
                "StrMinMax max ({}) should not be less than min ({})",
                max, min
            )));
        }
        Ok(Self { min, max })
    }
}

impl CellProcessor for StrMinMax {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "StrMinMax")?;
        let length = value.to_string().chars().count();
        if length < self.min || length > self.max {
            return Err(CsvError::constraint(
                format!(
                    "the length ({}) of value '{}' does not lie between the min ({}) and max ({}) values (inclusive)",
                    length, value, self.min, self.max
                ),
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

/// String length (in characters) must be one of the allowed lengths
#[derive(Debug, Clone)]
pub struct Strlen {
    lengths: HashSet<usize>,
}

impl Strlen {
    pub fn new(lengths: impl IntoIterator<Item = usize>) -> CsvResult<Self> {
        let lengths: HashSet<usize> = lengths.into_iter().collect();
        if lengths.is_empty() {
            return Err(CsvError::configuration("Strlen needs at least one length"));
        }
        Ok(Self { lengths })
    }
}

impl CellProcessor for Strlen {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "Strlen")?;
        let length = value.to_string().chars().count();
        if !self.lengths.contains(&length) {
            let mut allowed: Vec<_> = self.lengths.iter().copied().collect();
            allowed.sort_unstable();
            return Err(CsvError::constraint(
                format!(
                    "the length ({}) of value '{}' does not match any of the required lengths {:?}",
                    length, value, allowed
                ),
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

fn non_empty_strings(items: Vec<String>, processor: &str) -> CsvResult<Vec<String>> {
    if items.is_empty() || items.iter().any(String::is_empty) {
        return Err(CsvError::configuration(format!(
            "{} needs at least one non-empty substring",
            processor
        )));
    }
    Ok(items)
}

/// The value must contain at least one of the substrings
#[derive(Debug, Clone)]
pub struct RequireSubStr {
    required: Vec<String>,
}

impl RequireSubStr {
    pub fn new<I>(required: I) -> CsvResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let required = required.into_iter().map(Into::into).collect();
        Ok(Self {
            required: non_empty_strings(required, "RequireSubStr")?,
        })
    }
}

impl CellProcessor for RequireSubStr {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "RequireSubStr")?;
        let text = value.to_string();
        if !self.required.iter().any(|s| text.contains(s.as_str())) {
            return Err(CsvError::constraint(
                format!("'{}' does not contain any of the required substrings", text),
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

/// The value must not contain any of the substrings
#[derive(Debug, Clone)]
pub struct ForbidSubStr {
    forbidden: Vec<String>,
}

impl ForbidSubStr {
    pub fn new<I>(forbidden: I) -> CsvResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let forbidden = forbidden.into_iter().map(Into::into).collect();
        Ok(Self {
            forbidden: non_empty_strings(forbidden, "ForbidSubStr")?,
        })
    }
}

impl CellProcessor for ForbidSubStr {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "ForbidSubStr")?;
        let text = value.to_string();
        if let Some(found) = self.forbidden.iter().find(|s| text.contains(s.as_str())) {
            return Err(CsvError::constraint(
                format!("'{}' contains the forbidden substring '{}'", text, found),
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

/// The value must be one of a fixed set
#[derive(Debug, Clone)]
pub struct IsIncludedIn {
    allowed: HashSet<CellValue>,
}

impl IsIncludedIn {
    pub fn new<I>(allowed: I) -> CsvResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
    {
        let allowed: HashSet<CellValue> = allowed.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Err(CsvError::configuration("IsIncludedIn needs at least one value"));
        }
        Ok(Self { allowed })
    }
}

impl CellProcessor for IsIncludedIn {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "IsIncludedIn")?;
        if !self.allowed.contains(&value) {
            return Err(CsvError::constraint(
                format!("'{}' is not included in the allowed set of values", value),
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

/// The whole string form of the value must match a regular expression
#[derive(Debug, Clone)]
pub struct StrRegEx {
    pattern: String,
    regex: Regex,
}

impl StrRegEx {
    pub fn new(pattern: &str) -> CsvResult<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| CsvError::configuration(format!("StrRegEx pattern is invalid: {}", e)))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }
}

impl CellProcessor for StrRegEx {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        reject_null(&value, context, "StrRegEx")?;
        let text = value.to_string();
        if !self.regex.is_match(&text) {
            return Err(CsvError::constraint(
                format!("'{}' does not match the regular expression '{}'", text, self.pattern),
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

/// Every value seen by this instance must be equal.
///
/// Without a constant, the first value processed becomes the reference for
/// all later rows.
#[derive(Debug, Clone, Default)]
pub struct Equals {
    expected: Option<CellValue>,
}

impl Equals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(expected: impl Into<CellValue>) -> Self {
        Self {
            expected: Some(expected.into()),
        }
    }
}

impl CellProcessor for Equals {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        if let Some(expected) = &self.expected {
            if *expected != value {
                return Err(CsvError::constraint(
                    format!("'{}' is not equal to the expected value '{}'", value, expected),
                    value,
                    context,
                ));
            }
        } else {
            self.expected = Some(value.clone());
        }
        Ok(Flow::Next(value))
    }
}
