//! Miniature document tree and path-query library.
//!
//! This is the subject the arbortest harness instruments: a small element +
//! text tree with a parser for an XML subset, a raw/pretty serializer, and a
//! tiny absolute-path query engine. Its semantics are deliberately minimal;
//! what matters to the harness is the memory discipline:
//!
//! - every name/value payload is allocated through the process-wide hook
//!   pair installed with [`set_memory_hooks`] (default: the real allocator);
//! - a null return from the allocation hook propagates as
//!   [`Error::OutOfMemory`] through every construction path, never a crash.

#![allow(unsafe_code)]

mod alloc;
mod query;
mod tree;

use thiserror::Error;

pub use alloc::{AllocFn, DeallocFn, set_memory_hooks};
pub use query::Query;
pub use tree::{Document, Format, Node, NodeId};

/// Errors surfaced by the library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The installed allocation hook returned null.
    #[error("out of memory")]
    OutOfMemory,
    /// The input text is not in the supported document subset.
    #[error("parse error at offset {offset}: {reason}")]
    Parse { offset: usize, reason: &'static str },
    /// The query text is not in the supported grammar.
    #[error("query compile error: {0}")]
    QueryCompile(&'static str),
}
