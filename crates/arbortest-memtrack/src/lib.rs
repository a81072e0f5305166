//! Allocation instrumentation for the arbortest harness.
//!
//! The library under test routes all of its internal dynamic memory through
//! an installable pair of allocation hooks. This crate provides the tracked
//! implementation of that pair:
//! - [`MemoryTracker`]: live/peak byte and block accounting with per-pointer
//!   usable-size records.
//! - deterministic fault injection: once a cumulative-byte threshold is set,
//!   the first request that would push live bytes past it fails like a real
//!   out-of-memory condition.
//! - [`tracked_alloc`] / [`tracked_free`]: free functions over the
//!   process-wide tracker, shaped to match the subject library's hook
//!   signature.
//!
//! The tracker is internally locked so the process-wide instance is sound to
//! reach from anywhere, but the harness contract is strictly single-threaded:
//! one test mutates it at a time, and the runner resets it between tests.

#![allow(unsafe_code)]

mod tracker;

pub use tracker::{MemoryStats, MemoryTracker, tracked_alloc, tracked_free};
