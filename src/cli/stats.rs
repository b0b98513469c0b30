//! Statistics for one command-line run

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters collected while copying records from input to output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Physical lines consumed from the input
    pub lines_read: usize,
    /// Data records read, header excluded
    pub rows_read: usize,
    /// Records written to the output, header excluded
    pub rows_written: usize,
    /// Records skipped because a column check failed
    pub rows_rejected: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Timestamp of when statistics were collected
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self {
            lines_read: 0,
            rows_read: 0,
            rows_written: 0,
            rows_rejected: 0,
            processing_time_ms: 0,
            collected_at: chrono::Utc::now(),
        }
    }
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the elapsed time and collection time
    pub fn finish(&mut self, lines_read: usize, elapsed: Duration) {
        self.lines_read = lines_read;
        self.processing_time_ms = elapsed.as_millis() as u64;
        self.collected_at = chrono::Utc::now();
    }

    /// Share of data rows that passed every check, as a percentage
    pub fn acceptance_rate(&self) -> f32 {
        if self.rows_read == 0 {
            return 100.0;
        }
        (self.rows_read - self.rows_rejected) as f32 / self.rows_read as f32 * 100.0
    }

    /// Get a formatted summary
    pub fn summary(&self) -> String {
        format!(
            "Read {} rows ({} lines) in {:.1}s - {} written, {} rejected ({:.1}% accepted)",
            self.rows_read,
            self.lines_read,
            self.processing_time_ms as f32 / 1000.0,
            self.rows_written,
            self.rows_rejected,
            self.acceptance_rate()
        )
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
