//! Wiring of the tracked allocation hooks into the subject library.

use std::sync::Once;

use arbortest_dom::{Document, set_memory_hooks};
use arbortest_memtrack::{tracked_alloc, tracked_free};

/// Install the tracked allocation hooks into the subject library.
///
/// Exercises the library once on its default allocator first, so one-time
/// internal allocation paths are warmed before tracking starts and are
/// never attributed to the first test. Installation is global and takes
/// effect for every subsequent allocation the library performs. Idempotent.
pub fn install_memory_instrumentation() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // Touch construction, mutation and drop paths before the swap.
        {
            let mut doc = Document::new();
            let root = doc.root_id();
            let _ = doc.append_child(root, "node");
        }
        set_memory_hooks(tracked_alloc, tracked_free);
    });
}
