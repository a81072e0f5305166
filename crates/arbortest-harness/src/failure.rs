//! Structured failure values returned by test bodies.
//!
//! The check macros bail out of the body with `return Err(..)`; the runner
//! is the only place these values are consumed. Unlike a jump-based abort,
//! intervening values are dropped normally on the way out.

use std::fmt;

use thiserror::Error;

/// Diagnostic recorded by a failed check: the literal condition text plus
/// the source location of the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckFailure {
    pub message: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.file, self.line)
    }
}

/// Why a test body bailed out early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestFail {
    /// A check's condition was false.
    #[error("{0}")]
    Check(CheckFailure),
    /// The library under test surfaced an error through its `Result`
    /// channel (propagated into the body with `?`).
    #[error("library error: {0}")]
    Library(#[from] arbortest_dom::Error),
}

impl TestFail {
    /// Build the check variant; used by the check macros.
    #[must_use]
    pub fn check(message: &'static str, file: &'static str, line: u32) -> Self {
        Self::Check(CheckFailure {
            message,
            file,
            line,
        })
    }
}

/// What every test body returns.
pub type TestResult = Result<(), TestFail>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_failure_displays_message_and_location() {
        let fail = TestFail::check("1 == 2 is false", "suite.rs", 42);
        assert_eq!(fail.to_string(), "1 == 2 is false at suite.rs:42");
    }

    #[test]
    fn library_errors_convert_via_question_mark() {
        fn body() -> TestResult {
            Err(arbortest_dom::Error::OutOfMemory)?;
            Ok(())
        }
        let err = body().expect_err("body fails");
        assert!(matches!(
            err,
            TestFail::Library(arbortest_dom::Error::OutOfMemory)
        ));
        assert_eq!(err.to_string(), "library error: out of memory");
    }
}
