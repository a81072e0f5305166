//! Process-wide memory hooks and hook-allocated string payloads.
//!
//! The hook pair defaults to the real allocator. A harness installs its
//! tracked pair once, before any test runs; from then on every payload the
//! library allocates or releases flows through the installed functions.

use std::ptr;
use std::slice;
use std::str;

use parking_lot::Mutex;

use crate::Error;

/// Allocate-by-size hook. Returns null on failure.
pub type AllocFn = fn(usize) -> *mut u8;

/// Deallocate-by-pointer hook. Must accept any pointer its paired
/// [`AllocFn`] returned.
pub type DeallocFn = fn(*mut u8);

#[derive(Clone, Copy)]
struct Hooks {
    alloc: AllocFn,
    dealloc: DeallocFn,
}

fn default_alloc(size: usize) -> *mut u8 {
    // SAFETY: malloc is sound for any size; callers handle null.
    unsafe { libc::malloc(size).cast() }
}

fn default_dealloc(ptr: *mut u8) {
    // SAFETY: `ptr` was returned by the paired allocation hook (malloc).
    unsafe { libc::free(ptr.cast()) };
}

static HOOKS: Mutex<Hooks> = Mutex::new(Hooks {
    alloc: default_alloc,
    dealloc: default_dealloc,
});

/// Install the process-wide allocation hooks.
///
/// Global and immediate: all subsequent payload allocations and releases use
/// the new pair. Payloads allocated under a previous pair are still released
/// through the current one, so replacement pairs must accept pointers from
/// the allocator the previous pair delegated to.
pub fn set_memory_hooks(alloc: AllocFn, dealloc: DeallocFn) {
    *HOOKS.lock() = Hooks { alloc, dealloc };
}

fn hooks() -> Hooks {
    *HOOKS.lock()
}

/// An owned string payload living in hook-allocated memory.
#[derive(Debug)]
pub(crate) struct HeapStr {
    ptr: *mut u8,
    len: usize,
}

impl HeapStr {
    /// The empty payload; allocates nothing.
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    /// Copy `text` into a hook-allocated buffer.
    pub(crate) fn new(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        let ptr = (hooks().alloc)(text.len());
        if ptr.is_null() {
            return Err(Error::OutOfMemory);
        }
        // SAFETY: `ptr` is valid for `text.len()` writes and the ranges are
        // disjoint.
        unsafe { ptr::copy_nonoverlapping(text.as_ptr(), ptr, text.len()) };
        Ok(Self {
            ptr,
            len: text.len(),
        })
    }

    pub(crate) fn as_str(&self) -> &str {
        if self.len == 0 {
            return "";
        }
        // SAFETY: the buffer holds `len` bytes copied verbatim from a &str
        // and is never mutated afterwards.
        unsafe { str::from_utf8_unchecked(slice::from_raw_parts(self.ptr, self.len)) }
    }
}

impl Drop for HeapStr {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            (hooks().dealloc)(self.ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_allocates_nothing() {
        let s = HeapStr::empty();
        assert_eq!(s.as_str(), "");
        let s = HeapStr::new("").expect("empty string");
        assert_eq!(s.as_str(), "");
    }

    #[test]
    fn payload_round_trips_through_hook_memory() {
        let s = HeapStr::new("node-name").expect("alloc");
        assert_eq!(s.as_str(), "node-name");
    }
}
