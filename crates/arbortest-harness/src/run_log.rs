//! Structured JSONL run log.
//!
//! One record per executed test, appended as a JSON line. Disabled unless
//! the driver is configured with a log path (see [`crate::config`]).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::report;
use crate::runner::{Outcome, TestReport};

/// Outcome tag for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutcome {
    Passed,
    CheckFailed,
    LibraryError,
    LeakDetected,
    Unknown,
}

impl From<&Outcome> for LogOutcome {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Passed => Self::Passed,
            Outcome::CheckFailed(_) => Self::CheckFailed,
            Outcome::LibraryError(_) => Self::LibraryError,
            Outcome::LeakDetected { .. } => Self::LeakDetected,
            Outcome::Unknown(_) => Self::Unknown,
        }
    }
}

/// Canonical log record for one executed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub test: String,
    pub outcome: LogOutcome,
    /// Failure reason; absent for passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Tracker snapshot after the body finished.
    pub live_bytes: usize,
    pub live_count: usize,
}

impl RunLogEntry {
    #[must_use]
    pub fn from_report(report: &TestReport) -> Self {
        Self {
            test: report.name.clone(),
            outcome: LogOutcome::from(&report.outcome),
            detail: report::failure_reason(&report.outcome),
            live_bytes: report.stats.live_bytes,
            live_count: report.stats.live_count,
        }
    }
}

/// Appends JSONL records to a writer.
pub struct LogEmitter<W: Write> {
    out: W,
}

impl LogEmitter<BufWriter<File>> {
    /// Create (truncate) a log file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> LogEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Append one record as a JSON line.
    pub fn emit(&mut self, entry: &RunLogEntry) -> io::Result<()> {
        let line = serde_json::to_string(entry).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")
    }

    /// Flush and hand the writer back.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Parse one JSONL line back into a record.
pub fn validate_log_line(line: &str) -> Result<RunLogEntry, serde_json::Error> {
    serde_json::from_str(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_round_trip_through_jsonl() {
        let entry = RunLogEntry {
            test: "leaks".to_owned(),
            outcome: LogOutcome::LeakDetected,
            detail: Some("memory leaks found (24 bytes in 1 allocations)".to_owned()),
            live_bytes: 24,
            live_count: 1,
        };

        let mut emitter = LogEmitter::new(Vec::new());
        emitter.emit(&entry).expect("emit");
        let buffer = emitter.finish().expect("finish");
        let line = String::from_utf8(buffer).expect("utf8");

        assert!(line.ends_with('\n'));
        let parsed = validate_log_line(line.trim_end()).expect("valid line");
        assert_eq!(parsed, entry);
    }

    #[test]
    fn passing_entries_omit_the_detail_field() {
        let entry = RunLogEntry {
            test: "passes".to_owned(),
            outcome: LogOutcome::Passed,
            detail: None,
            live_bytes: 0,
            live_count: 0,
        };

        let mut emitter = LogEmitter::new(Vec::new());
        emitter.emit(&entry).expect("emit");
        let line = String::from_utf8(emitter.finish().expect("finish")).expect("utf8");

        assert!(!line.contains("detail"));
        assert!(line.contains("\"outcome\":\"passed\""));
    }

    #[test]
    fn reports_map_onto_log_entries() {
        use crate::failure::CheckFailure;
        use arbortest_memtrack::MemoryStats;

        let report = TestReport {
            name: "aborts".to_owned(),
            outcome: Outcome::CheckFailed(CheckFailure {
                message: "1 == 2 is false",
                file: "suite.rs",
                line: 7,
            }),
            stats: MemoryStats {
                live_bytes: 24,
                live_count: 1,
                peak_bytes: 24,
                total_allocations: 1,
            },
        };

        let entry = RunLogEntry::from_report(&report);
        assert_eq!(entry.test, "aborts");
        assert_eq!(entry.outcome, LogOutcome::CheckFailed);
        assert_eq!(
            entry.detail.as_deref(),
            Some("1 == 2 is false at suite.rs:7")
        );
        assert_eq!(entry.live_bytes, 24);
        assert_eq!(entry.live_count, 1);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(validate_log_line("{\"test\":\"x\"}").is_err());
        assert!(validate_log_line("not json").is_err());
    }
}
