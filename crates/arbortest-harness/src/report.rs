//! Rendering of per-test diagnostics and the final summary.

use std::io::{self, Write};

use crate::runner::{Outcome, RunSummary, TestReport};

/// One `Test <name> failed: <reason>` line per failing test, then the
/// summary line.
pub fn render(reports: &[TestReport], summary: &RunSummary, out: &mut dyn Write) -> io::Result<()> {
    for report in reports {
        if let Some(reason) = failure_reason(&report.outcome) {
            writeln!(out, "Test {} failed: {}", report.name, reason)?;
        }
    }
    writeln!(out, "{}", summary_line(summary))
}

/// The reason text for a failing outcome; `None` for a pass.
#[must_use]
pub fn failure_reason(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Passed => None,
        Outcome::CheckFailed(failure) => Some(failure.to_string()),
        Outcome::LibraryError(error) => Some(format!("library error: {error}")),
        Outcome::LeakDetected { bytes, count } => Some(format!(
            "memory leaks found ({bytes} bytes in {count} allocations)"
        )),
        Outcome::Unknown(Some(message)) => Some(format!("panic: {message}")),
        Outcome::Unknown(None) => Some("unknown failure".to_owned()),
    }
}

/// `Success: <total> tests passed.` or
/// `FAILURE: <failed> out of <total> tests failed.`
#[must_use]
pub fn summary_line(summary: &RunSummary) -> String {
    if summary.all_passed() {
        format!("Success: {} tests passed.", summary.total)
    } else {
        format!(
            "FAILURE: {} out of {} tests failed.",
            summary.failed(),
            summary.total
        )
    }
}
