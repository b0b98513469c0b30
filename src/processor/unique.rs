//! Uniqueness checks across rows
//!
//! Both processors remember every value they have accepted for as long as the
//! instance lives. State is never reset between rows and never shared between
//! separately constructed processors.

use super::{CellProcessor, CellValue, Flow};
use crate::context::CsvContext;
use crate::error::{CsvError, CsvResult};
use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Rejects a value that was already seen by this instance
#[derive(Debug, Clone, Default)]
pub struct Unique {
    seen: HashMap<CellValue, usize>,
}

impl Unique {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct values accepted so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl CellProcessor for Unique {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        match self.seen.entry(value.clone()) {
            Entry::Occupied(first) => Err(CsvError::constraint(
                format!(
                    "duplicate value '{}' encountered, first seen on row {}",
                    value,
                    first.get()
                ),
                value,
                context,
            )),
            Entry::Vacant(slot) => {
                slot.insert(context.row_number);
                Ok(Flow::Next(value))
            }
        }
    }
}

/// Rejects a value whose hash was already seen by this instance.
///
/// Only hashes are kept; two values with colliding hashes are reported as
/// duplicates.
#[derive(Debug, Clone, Default)]
pub struct UniqueHashCode {
    seen: HashMap<u64, usize>,
}

impl UniqueHashCode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CellProcessor for UniqueHashCode {
    fn execute(&mut self, value: CellValue, context: &CsvContext) -> CsvResult<Flow> {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        let code = hasher.finish();

        if let Some(first_row) = self.seen.get(&code) {
            return Err(CsvError::constraint(
                format!(
                    "duplicate value '{}' encountered with hashcode {}, first seen on row {}",
                    value, code, first_row
                ),
                value,
                context,
            ));
        }
        self.seen.insert(code, context.row_number);
        Ok(Flow::Next(value))
    }
}
