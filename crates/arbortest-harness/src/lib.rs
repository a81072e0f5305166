//! Unit-test harness for the arbortest document/query library.
//!
//! This crate provides:
//! - Test registration: an explicit, insertion-ordered [`TestRegistry`]
//!   populated by per-module registration calls before the driver starts.
//! - Checks: macros that verify a condition and, on failure, return a
//!   structured diagnostic from the test body. The failure value is caught
//!   at exactly one boundary, the runner's per-test frame; code after a
//!   failed check never executes, while destructors of intervening values
//!   still run.
//! - Memory instrumentation: per-test reset of the allocation tracker, leak
//!   detection after every test that completes normally, and deterministic
//!   out-of-memory injection via a cumulative-byte threshold.
//! - The runner and report: per-test outcome classification, one diagnostic
//!   line per failing test, a final summary, and an optional JSONL run log.

#![forbid(unsafe_code)]

pub mod checks;
pub mod config;
pub mod failure;
pub mod install;
pub mod registry;
pub mod report;
pub mod run_log;
pub mod runner;

pub use failure::{CheckFailure, TestFail, TestResult};
pub use install::install_memory_instrumentation;
pub use registry::{FnTest, TestCase, TestContext, TestRegistry};
pub use runner::{Outcome, RunSummary, TestReport, TestRunner};
