//! Live-allocation accounting with deterministic fault injection.

use std::collections::HashMap;
use std::ptr;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::Serialize;

/// Mutable accounting state behind the tracker's lock.
#[derive(Debug, Default)]
struct TrackerState {
    /// Usable bytes currently live (allocator-reported, not requested).
    live_bytes: usize,
    /// Blocks currently live.
    live_count: usize,
    /// High-water mark of `live_bytes` since the last reset.
    peak_bytes: usize,
    /// Successful allocations since the last reset.
    total_allocations: u64,
    /// Cumulative-byte fault-injection threshold; 0 disables injection.
    fail_threshold: usize,
    /// Recorded usable size per live pointer.
    blocks: HashMap<usize, usize>,
}

/// Point-in-time snapshot of the tracker's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub live_bytes: usize,
    pub live_count: usize,
    pub peak_bytes: usize,
    pub total_allocations: u64,
}

impl MemoryStats {
    /// True when no tracked allocation is outstanding.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.live_bytes == 0 && self.live_count == 0
    }
}

/// Allocation tracker wrapping the real allocator.
///
/// Accounting uses the allocator's reported usable size (`malloc` may round
/// a request up), so leak checks balance exactly against what `deallocate`
/// later subtracts from the per-pointer record.
pub struct MemoryTracker {
    state: Mutex<TrackerState>,
}

impl MemoryTracker {
    /// Create a tracker with zeroed counters and fault injection disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// The process-wide tracker the installable hooks forward to.
    pub fn global() -> &'static MemoryTracker {
        static GLOBAL: OnceLock<MemoryTracker> = OnceLock::new();
        GLOBAL.get_or_init(MemoryTracker::new)
    }

    /// Allocate `size` bytes through the real allocator, with accounting.
    ///
    /// Returns null on failure. A fault-injected failure (the request would
    /// push cumulative live bytes past the configured threshold) mutates no
    /// counters, exactly like a real out-of-memory return.
    pub fn allocate(&self, size: usize) -> *mut u8 {
        let mut state = self.state.lock();

        if state.fail_threshold > 0 && state.live_bytes.saturating_add(size) > state.fail_threshold
        {
            return ptr::null_mut();
        }

        // SAFETY: malloc is sound for any size; null is handled below.
        let raw = unsafe { libc::malloc(size) };
        if raw.is_null() {
            return ptr::null_mut();
        }
        // SAFETY: `raw` is a live malloc pointer.
        let usable = unsafe { libc::malloc_usable_size(raw) };

        state.live_bytes += usable;
        state.live_count += 1;
        state.total_allocations += 1;
        state.peak_bytes = state.peak_bytes.max(state.live_bytes);
        state.blocks.insert(raw as usize, usable);

        raw.cast()
    }

    /// Release a pointer previously returned by [`MemoryTracker::allocate`].
    ///
    /// Null is a no-op. A pointer without a recorded block (allocated before
    /// the hooks were installed) is released without touching the counters.
    pub fn deallocate(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        let mut state = self.state.lock();
        if let Some(usable) = state.blocks.remove(&(ptr as usize)) {
            state.live_bytes -= usable;
            state.live_count -= 1;
        }
        // SAFETY: the caller hands back a pointer it obtained from the
        // allocation hook, which delegates to malloc either way.
        unsafe { libc::free(ptr.cast()) };
    }

    /// Zero every counter, clear block records, and disable fault injection.
    ///
    /// Runs unconditionally at the start of each test regardless of how the
    /// previous test ended; idempotent when the state is already clean.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        *state = TrackerState::default();
    }

    /// Configure the cumulative-byte fault-injection threshold (0 disables).
    pub fn set_fail_threshold(&self, bytes: usize) {
        self.state.lock().fail_threshold = bytes;
    }

    /// Currently configured fault-injection threshold.
    #[must_use]
    pub fn fail_threshold(&self) -> usize {
        self.state.lock().fail_threshold
    }

    /// Snapshot the counters.
    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        let state = self.state.lock();
        MemoryStats {
            live_bytes: state.live_bytes,
            live_count: state.live_count,
            peak_bytes: state.peak_bytes,
            total_allocations: state.total_allocations,
        }
    }
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocation hook over the process-wide tracker.
///
/// Matches the subject library's alloc-by-size hook signature.
pub fn tracked_alloc(size: usize) -> *mut u8 {
    MemoryTracker::global().allocate(size)
}

/// Deallocation hook over the process-wide tracker.
pub fn tracked_free(ptr: *mut u8) {
    MemoryTracker::global().deallocate(ptr);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_then_free_balances_to_zero() {
        let tracker = MemoryTracker::new();
        let ptr = tracker.allocate(16);
        assert!(!ptr.is_null());

        let stats = tracker.stats();
        assert_eq!(stats.live_count, 1);
        assert!(stats.live_bytes >= 16, "usable size covers the request");

        tracker.deallocate(ptr);
        assert!(tracker.stats().is_balanced());
    }

    #[test]
    fn accounting_uses_reported_usable_size() {
        let tracker = MemoryTracker::new();
        let ptr = tracker.allocate(3);
        assert!(!ptr.is_null());
        // The allocator may round up; the recorded size must cover the
        // request so the later subtraction balances exactly.
        assert!(tracker.stats().live_bytes >= 3);
        tracker.deallocate(ptr);
        assert_eq!(tracker.stats().live_bytes, 0);
    }

    #[test]
    fn threshold_blocks_allocation_without_accounting() {
        let tracker = MemoryTracker::new();
        tracker.set_fail_threshold(8);

        let ptr = tracker.allocate(16);
        assert!(ptr.is_null());

        let stats = tracker.stats();
        assert!(stats.is_balanced());
        assert_eq!(stats.total_allocations, 0);
        assert_eq!(stats.peak_bytes, 0);
    }

    #[test]
    fn requests_at_or_below_threshold_succeed() {
        let tracker = MemoryTracker::new();
        tracker.set_fail_threshold(4096);

        let first = tracker.allocate(64);
        assert!(!first.is_null());
        let live = tracker.stats().live_bytes;

        // A request that lands exactly on the threshold still succeeds.
        let exact = 4096 - live;
        let second = tracker.allocate(exact);
        assert!(!second.is_null());

        // Live bytes now sit at or above the threshold, so one more byte
        // must be rejected.
        let third = tracker.allocate(1);
        assert!(third.is_null());
        assert_eq!(tracker.stats().live_count, 2);

        tracker.deallocate(second);
        tracker.deallocate(first);
        assert!(tracker.stats().is_balanced());
    }

    #[test]
    fn null_free_is_a_noop() {
        let tracker = MemoryTracker::new();
        tracker.deallocate(ptr::null_mut());
        assert!(tracker.stats().is_balanced());
    }

    #[test]
    fn unrecorded_pointer_free_leaves_counters_alone() {
        let tracker = MemoryTracker::new();
        // SAFETY: plain malloc; ownership passes to deallocate below.
        let foreign = unsafe { libc::malloc(32) }.cast::<u8>();
        assert!(!foreign.is_null());

        tracker.deallocate(foreign);
        assert!(tracker.stats().is_balanced());
    }

    #[test]
    fn reset_is_idempotent_and_clears_threshold() {
        let tracker = MemoryTracker::new();
        tracker.set_fail_threshold(128);
        let ptr = tracker.allocate(16);
        assert!(!ptr.is_null());
        tracker.deallocate(ptr);

        tracker.reset();
        let stats = tracker.stats();
        assert!(stats.is_balanced());
        assert_eq!(stats.peak_bytes, 0);
        assert_eq!(stats.total_allocations, 0);
        assert_eq!(tracker.fail_threshold(), 0);

        // Resetting clean state leaves it clean.
        tracker.reset();
        assert!(tracker.stats().is_balanced());
        assert_eq!(tracker.fail_threshold(), 0);
    }

    #[test]
    fn peak_tracks_the_high_water_mark() {
        let tracker = MemoryTracker::new();
        let a = tracker.allocate(100);
        let b = tracker.allocate(100);
        let peak = tracker.stats().peak_bytes;
        assert!(peak >= 200);

        tracker.deallocate(a);
        tracker.deallocate(b);
        let stats = tracker.stats();
        assert!(stats.is_balanced());
        assert_eq!(stats.peak_bytes, peak, "peak survives frees until reset");
    }

    #[test]
    fn global_hooks_forward_to_the_shared_tracker() {
        // The global tracker is shared process state; this test only checks
        // the forwarding delta so it stays order-independent.
        let before = MemoryTracker::global().stats().live_count;
        let ptr = tracked_alloc(8);
        assert!(!ptr.is_null());
        assert_eq!(MemoryTracker::global().stats().live_count, before + 1);
        tracked_free(ptr);
        assert_eq!(MemoryTracker::global().stats().live_count, before);
    }
}
