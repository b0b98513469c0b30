//! Comment line recognition

use crate::error::{CsvError, CsvResult};
use regex::Regex;

/// Decides whether a physical line at the start of a record is a comment
#[derive(Debug, Clone)]
pub enum CommentMatcher {
    /// Line starts with the given prefix
    StartsWith(String),
    /// Line matches the whole regular expression
    Matches(Regex),
}

impl CommentMatcher {
    pub fn starts_with(prefix: impl Into<String>) -> CsvResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CsvError::configuration("comment prefix cannot be empty"));
        }
        Ok(CommentMatcher::StartsWith(prefix))
    }

    pub fn matches(pattern: &str) -> CsvResult<Self> {
        let anchored = format!("^(?:{})$", pattern);
        Regex::new(&anchored)
            .map(CommentMatcher::Matches)
            .map_err(|e| CsvError::configuration(format!("invalid comment pattern: {}", e)))
    }

    pub fn is_comment(&self, line: &str) -> bool {
        match self {
            CommentMatcher::StartsWith(prefix) => line.starts_with(prefix.as_str()),
            CommentMatcher::Matches(regex) => regex.is_match(line),
        }
    }
}
