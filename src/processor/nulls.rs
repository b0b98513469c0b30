//! Processors dealing with absent cells
//!
//! An absent cell is either [`CellValue::Null`] or an empty string; the
//! tokenizer reports an empty field as an empty string.

use super::{require_str, CellProcessor, CellValue, Flow};
use crate::context::CsvContext;
use crate::error::{CsvError, CsvResult};

/// Ends the chain with `Null` for an absent cell, otherwise forwards it
#[derive(Debug, Clone, Copy, Default)]
pub struct Optional;

impl CellProcessor for Optional {
    fn execute(&mut self, value: CellValue, _context: &CsvContext) -> CsvResult<Flow> {
        if value.is_absent() {
            Ok(Flow::Done(CellValue::Null))
        } else {
            Ok(Flow::Next(value))
        }
    }
}

/// Rejects absent cells
#[derive(Debug, Clone, Copy, Default)]
pub struct NotNull;

impl CellProcessor for NotNull {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        if value.is_absent() {
            return Err(CsvError::constraint(
                "null value encountered",
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}

/// Ends the chain with a fixed replacement for an absent cell
#[derive(Debug, Clone)]
pub struct ConvertNullTo {
    replacement: CellValue,
}

impl ConvertNullTo {
    pub fn new(replacement: impl Into<CellValue>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl CellProcessor for ConvertNullTo {
    fn execute(&mut self, value: CellValue, _context: &CsvContext) -> CsvResult<Flow> {
        if value.is_absent() {
            Ok(Flow::Done(self.replacement.clone()))
        } else {
            Ok(Flow::Next(value))
        }
    }
}

/// Requires a non-empty string
#[derive(Debug, Clone, Copy, Default)]
pub struct StrNotNullOrEmpty;

impl CellProcessor for StrNotNullOrEmpty {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        if matches!(value, CellValue::Null) {
            return Err(CsvError::constraint("null value encountered", value, context));
        }
        if require_str(&value, context, "StrNotNullOrEmpty")?.is_empty() {
            return Err(CsvError::constraint(
                "unexpected empty string",
                value,
                context,
            ));
        }
        Ok(Flow::Next(value))
    }
}
