//! Session handle table.
//!
//! Recording sessions cross the ABI as opaque `u64` handles. Handles
//! stay in the table after their session reaches a terminal state so a
//! repeated stop or abort reports an invalid-session status instead of
//! an unknown handle looking identical to one that never existed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use grabkit_bridge::RecordingSession;

static SESSIONS: OnceLock<Mutex<HashMap<u64, Arc<RecordingSession>>>> = OnceLock::new();
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn table() -> &'static Mutex<HashMap<u64, Arc<RecordingSession>>> {
    SESSIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Store a session and return its handle. Handle 0 is never issued.
pub(crate) fn insert(session: RecordingSession) -> u64 {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    table().lock().insert(handle, Arc::new(session));
    handle
}

/// Look up a session by handle.
pub(crate) fn get(handle: u64) -> Option<Arc<RecordingSession>> {
    table().lock().get(&handle).cloned()
}
