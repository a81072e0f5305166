//! Test execution engine.
//!
//! Runs every registered case in order, isolating tests from one another by
//! resetting the allocation tracker before each body. Bodies are invoked
//! inside a `catch_unwind` boundary so an unexpected panic is classified
//! instead of tearing the run down; no test's failure prevents later tests
//! from running.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use arbortest_memtrack::{MemoryStats, MemoryTracker};

use crate::failure::{CheckFailure, TestFail};
use crate::registry::{TestContext, TestRegistry};

/// How a single test ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    /// A check's condition was false. The leak check is skipped on this
    /// path: bookkeeping interrupted mid-body is diagnostic only.
    CheckFailed(CheckFailure),
    /// The library under test surfaced an error through its `Result`
    /// channel.
    LibraryError(arbortest_dom::Error),
    /// The body completed but left tracked allocations outstanding.
    LeakDetected { bytes: usize, count: usize },
    /// The body terminated abnormally (panicked); the payload text is kept
    /// when there is one.
    Unknown(Option<String>),
}

impl Outcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// Result record for one executed test.
#[derive(Debug, Clone)]
pub struct TestReport {
    pub name: String,
    pub outcome: Outcome,
    /// Tracker snapshot taken right after the body finished. Authoritative
    /// for the leak check only when the body completed normally.
    pub stats: MemoryStats,
}

/// Aggregate totals for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
}

impl RunSummary {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs a registry against one tracker.
///
/// The runner owns the decision to reset the shared tracker; bodies only
/// reach it through their [`TestContext`].
pub struct TestRunner<'t> {
    tracker: &'t MemoryTracker,
}

impl TestRunner<'static> {
    /// Runner over the process-wide tracker the installed hooks feed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tracker(MemoryTracker::global())
    }
}

impl Default for TestRunner<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> TestRunner<'t> {
    /// Runner over an explicit tracker instance.
    #[must_use]
    pub fn with_tracker(tracker: &'t MemoryTracker) -> Self {
        Self { tracker }
    }

    /// Run every registered case in registration order.
    ///
    /// Per test: reset the tracker, invoke the body inside the unwind
    /// boundary, classify the outcome, and aggregate. Tests run exactly
    /// once; order is stable across runs of the same binary.
    pub fn run_all(&self, registry: &TestRegistry) -> (Vec<TestReport>, RunSummary) {
        let _quiet = QuietPanics::engage();

        let mut reports = Vec::with_capacity(registry.len());
        let mut summary = RunSummary {
            total: 0,
            passed: 0,
        };

        for test in registry.iter() {
            self.tracker.reset();
            let cx = TestContext::new(self.tracker);

            let result = panic::catch_unwind(AssertUnwindSafe(|| test.run(&cx)));
            let stats = self.tracker.stats();

            let outcome = match result {
                Ok(Ok(())) => {
                    if stats.is_balanced() {
                        Outcome::Passed
                    } else {
                        Outcome::LeakDetected {
                            bytes: stats.live_bytes,
                            count: stats.live_count,
                        }
                    }
                }
                Ok(Err(TestFail::Check(failure))) => Outcome::CheckFailed(failure),
                Ok(Err(TestFail::Library(error))) => Outcome::LibraryError(error),
                Err(payload) => Outcome::Unknown(panic_message(&*payload)),
            };

            summary.total += 1;
            if outcome.passed() {
                summary.passed += 1;
            }
            reports.push(TestReport {
                name: test.name().to_owned(),
                outcome,
                stats,
            });
        }

        (reports, summary)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        Some((*text).to_owned())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

/// Silences the default panic hook while a run is in flight so caught
/// panics produce one classified report line instead of a backtrace dump.
struct QuietPanics {
    previous: Option<Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl QuietPanics {
    fn engage() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}
