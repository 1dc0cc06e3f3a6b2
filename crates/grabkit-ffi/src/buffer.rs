//! Ownership registry for buffers handed across the C ABI.
//!
//! Encoded captures are returned to the caller as a raw pointer plus
//! length. The registry keeps the backing allocation alive, keyed by
//! its address, until the caller releases it. Freeing an unknown or
//! null pointer is a no-op, and double frees cannot corrupt the heap
//! because the second lookup simply misses.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::OnceLock;

use parking_lot::Mutex;

static BUFFERS: OnceLock<Mutex<HashMap<usize, Box<[u8]>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<usize, Box<[u8]>>> {
    BUFFERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register an encoded buffer and return its (pointer, length) pair.
pub(crate) fn register(data: Vec<u8>) -> (*mut c_void, usize) {
    let boxed = data.into_boxed_slice();
    let len = boxed.len();
    let ptr = boxed.as_ptr() as usize;
    registry().lock().insert(ptr, boxed);
    (ptr as *mut c_void, len)
}

/// Release a previously registered buffer.
///
/// Returns `true` when the pointer was known and its allocation freed.
pub(crate) fn release(ptr: *const c_void) -> bool {
    if ptr.is_null() {
        return false;
    }
    registry().lock().remove(&(ptr as usize)).is_some()
}

#[cfg(test)]
pub(crate) fn outstanding() -> usize {
    registry().lock().len()
}
