//! Test cases, the registry, and the per-test context.
//!
//! The registry is an explicit object populated by registration calls
//! before the driver starts; traversal order is registration order and the
//! driver fixes cross-module order with a single ordered list. Nothing here
//! relies on static-initialization ordering.

use arbortest_memtrack::MemoryTracker;

use crate::failure::TestResult;

/// Handle to the shared instrumentation state for the duration of one test.
///
/// Bodies configure fault injection and inspect the tracker through this
/// handle only; retaining tracker state across test boundaries is not
/// supported.
pub struct TestContext<'t> {
    tracker: &'t MemoryTracker,
}

impl<'t> TestContext<'t> {
    pub(crate) fn new(tracker: &'t MemoryTracker) -> Self {
        Self { tracker }
    }

    /// Configure the cumulative-byte threshold past which tracked
    /// allocations fail (0 disables). Cleared by the runner before every
    /// test.
    pub fn set_memory_fail_threshold(&self, bytes: usize) {
        self.tracker.set_fail_threshold(bytes);
    }

    /// The tracker this test runs under.
    #[must_use]
    pub fn tracker(&self) -> &'t MemoryTracker {
        self.tracker
    }
}

/// A named unit of work.
pub trait TestCase {
    fn name(&self) -> &str;
    fn run(&self, cx: &TestContext<'_>) -> TestResult;
}

/// Test case backed by a plain function.
pub struct FnTest {
    name: &'static str,
    body: fn(&TestContext<'_>) -> TestResult,
}

impl FnTest {
    #[must_use]
    pub fn new(name: &'static str, body: fn(&TestContext<'_>) -> TestResult) -> Self {
        Self { name, body }
    }
}

impl TestCase for FnTest {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, cx: &TestContext<'_>) -> TestResult {
        (self.body)(cx)
    }
}

/// Insertion-ordered collection of test cases.
#[derive(Default)]
pub struct TestRegistry {
    cases: Vec<Box<dyn TestCase>>,
}

impl TestRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case at the end of the traversal order.
    pub fn add(&mut self, case: impl TestCase + 'static) {
        self.cases.push(Box::new(case));
    }

    /// Register a plain function as a case.
    pub fn add_fn(&mut self, name: &'static str, body: fn(&TestContext<'_>) -> TestResult) {
        self.add(FnTest::new(name, body));
    }

    /// Forward traversal in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn TestCase> {
        self.cases.iter().map(Box::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
