//! Memory-discipline tests: tracked round trips, leak hygiene of the
//! subject's construction paths, and graceful out-of-memory handling.

use arbortest_dom::Document;
use arbortest_harness::{TestContext, TestRegistry, TestResult, check};

pub fn register(registry: &mut TestRegistry) {
    registry.add_fn("memory_tracked_block_round_trip", tracked_block_round_trip);
    registry.add_fn("memory_injected_failure_returns_null", injected_failure_returns_null);
    registry.add_fn("memory_document_releases_payloads", document_releases_payloads);
    registry.add_fn("memory_parse_failure_releases_partial_tree", parse_failure_releases_partial_tree);
    registry.add_fn("memory_allocation_failure_is_graceful", allocation_failure_is_graceful);
}

fn tracked_block_round_trip(cx: &TestContext<'_>) -> TestResult {
    let tracker = cx.tracker();
    let block = tracker.allocate(16);
    check!(!block.is_null());
    check!(tracker.stats().live_count == 1);
    check!(tracker.stats().live_bytes >= 16);

    tracker.deallocate(block);
    check!(tracker.stats().is_balanced());
    Ok(())
}

fn injected_failure_returns_null(cx: &TestContext<'_>) -> TestResult {
    cx.set_memory_fail_threshold(8);

    let block = cx.tracker().allocate(16);
    check!(block.is_null());
    check!(cx.tracker().stats().is_balanced());
    Ok(())
}

fn document_releases_payloads(cx: &TestContext<'_>) -> TestResult {
    {
        let doc = Document::parse("<node><child>payload</child></node>")?;
        check!(doc.root().child("node").is_some());
        check!(cx.tracker().stats().live_count > 0);
    }
    // Dropping the document returns every payload to the tracker.
    check!(cx.tracker().stats().is_balanced());
    Ok(())
}

fn parse_failure_releases_partial_tree(cx: &TestContext<'_>) -> TestResult {
    check!(Document::parse("<node><child>").is_err());
    check!(cx.tracker().stats().is_balanced());
    Ok(())
}

fn allocation_failure_is_graceful(cx: &TestContext<'_>) -> TestResult {
    // Three payload allocations against an 8-byte threshold: the parse must
    // fail with an error, not crash, and must release what it already built.
    cx.set_memory_fail_threshold(8);
    let result = Document::parse("<aaaa><bbbb>cccc</bbbb></aaaa>");
    check!(result.is_err());
    check!(cx.tracker().stats().is_balanced());
    Ok(())
}
