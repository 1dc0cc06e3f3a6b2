//! C ABI for the grabkit capture bridge.
//!
//! Exposes stills (PNG buffers with an explicit free) and recording
//! sessions (opaque `u64` handles) to non-Rust hosts. Every entry point
//! returns a status code from [`status`]; out-parameters are only
//! written on success. Panics are caught at the boundary and reported
//! as a capture failure instead of unwinding into foreign frames.
//!
//! Environment knobs: `GRABKIT_LOG` configures the tracing filter and
//! `GRABKIT_BACKEND=synthetic` swaps the platform backend for the
//! deterministic synthetic one.

mod buffer;
mod handle;
mod status;

pub use status::{
    grabkit_status_message, GRABKIT_ERR_CAPTURE_FAILED, GRABKIT_ERR_ENCODING_FAILED,
    GRABKIT_ERR_FILE_CREATE_FAILED, GRABKIT_ERR_INVALID_SESSION, GRABKIT_ERR_NOT_AVAILABLE,
    GRABKIT_ERR_PERMISSION_DENIED, GRABKIT_OK,
};

use std::ffi::{c_char, c_int, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use grabkit_bridge::{BridgeResult, CaptureBridge, RecordingConfig};
use grabkit_capture::{Region, SyntheticBackend};

use status::status_code;

static BRIDGE: OnceLock<CaptureBridge> = OnceLock::new();
static TRACING: OnceLock<()> = OnceLock::new();

fn init_tracing() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_env("GRABKIT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        // The host process may already have a subscriber installed.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn bridge() -> &'static CaptureBridge {
    BRIDGE.get_or_init(|| {
        init_tracing();
        match std::env::var("GRABKIT_BACKEND").as_deref() {
            Ok("synthetic") => CaptureBridge::new(Box::new(SyntheticBackend::default())),
            _ => CaptureBridge::with_default_backend(),
        }
    })
}

/// Run an operation with panics converted to a capture-failed status.
fn guarded(op: impl FnOnce() -> c_int) -> c_int {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(status) => status,
        Err(_) => {
            error!("panic caught at the ABI boundary");
            GRABKIT_ERR_CAPTURE_FAILED
        }
    }
}

/// Write an encoded capture into the out-parameters.
///
/// # Safety
/// `out_data` and `out_len` must be valid for writes.
unsafe fn capture_into(
    result: BridgeResult<Vec<u8>>,
    out_data: *mut *mut c_void,
    out_len: *mut usize,
) -> c_int {
    if out_data.is_null() || out_len.is_null() {
        return GRABKIT_ERR_CAPTURE_FAILED;
    }
    match result {
        Ok(png) => {
            let (ptr, len) = buffer::register(png);
            *out_data = ptr;
            *out_len = len;
            GRABKIT_OK
        }
        Err(err) => {
            warn!("capture failed: {err}");
            status_code(&err)
        }
    }
}

/// Whether screen capture is available. Returns 1 or 0.
#[no_mangle]
pub extern "C" fn grabkit_is_available() -> c_int {
    guarded(|| {
        if bridge().is_available() {
            1
        } else {
            0
        }
    })
}

/// Capture the full screen as a PNG buffer.
///
/// On success `*out_data` points at the encoded bytes and `*out_len`
/// holds their length; release with [`grabkit_free_buffer`].
///
/// # Safety
/// `out_data` and `out_len` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn grabkit_capture_fullscreen(
    out_data: *mut *mut c_void,
    out_len: *mut usize,
) -> c_int {
    guarded(|| capture_into(bridge().capture_fullscreen(), out_data, out_len))
}

/// Capture a region of the screen as a PNG buffer.
///
/// The rectangle must have positive width and height; a degenerate
/// rectangle (the all-zero one included) reports a capture failure.
/// The zero-means-fullscreen convention applies to recording only.
///
/// # Safety
/// `out_data` and `out_len` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn grabkit_capture_region(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    out_data: *mut *mut c_void,
    out_len: *mut usize,
) -> c_int {
    guarded(|| {
        let region = Region::new(x, y, width, height);
        capture_into(bridge().capture_region(region), out_data, out_len)
    })
}

/// Capture a single window as a PNG buffer.
///
/// # Safety
/// `out_data` and `out_len` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn grabkit_capture_window(
    window_id: u32,
    out_data: *mut *mut c_void,
    out_len: *mut usize,
) -> c_int {
    guarded(|| capture_into(bridge().capture_window(window_id), out_data, out_len))
}

/// Release a buffer returned by a capture call.
///
/// Null and already-freed pointers are ignored.
#[no_mangle]
pub extern "C" fn grabkit_free_buffer(data: *const c_void) {
    let _ = guarded(|| {
        buffer::release(data);
        GRABKIT_OK
    });
}

/// Start a recording to `path`.
///
/// An all-zero rectangle records the full screen. `show_cursor` is a
/// boolean (nonzero composites the cursor). On success `*out_session`
/// receives a nonzero session handle; the first frame has already been
/// captured when this returns.
///
/// # Safety
/// `path` must be a valid NUL-terminated UTF-8 string and
/// `out_session` valid for writes.
#[no_mangle]
pub unsafe extern "C" fn grabkit_start_recording(
    path: *const c_char,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    fps: u32,
    show_cursor: c_int,
    out_session: *mut u64,
) -> c_int {
    guarded(|| {
        if path.is_null() || out_session.is_null() {
            return GRABKIT_ERR_CAPTURE_FAILED;
        }
        let path = match CStr::from_ptr(path).to_str() {
            Ok(s) => PathBuf::from(s),
            Err(_) => return GRABKIT_ERR_CAPTURE_FAILED,
        };

        let config = RecordingConfig::fullscreen(path, fps)
            .with_region(Region::new(x, y, width, height))
            .with_cursor(show_cursor != 0);

        match bridge().start_recording(&config) {
            Ok(session) => {
                *out_session = handle::insert(session);
                GRABKIT_OK
            }
            Err(err) => {
                warn!("start_recording failed: {err}");
                status_code(&err)
            }
        }
    })
}

/// Stop a recording and finalize its output file.
#[no_mangle]
pub extern "C" fn grabkit_stop_recording(session: u64) -> c_int {
    guarded(|| match handle::get(session) {
        Some(session) => match session.stop() {
            Ok(()) => GRABKIT_OK,
            Err(err) => {
                warn!("stop_recording failed: {err}");
                status_code(&err)
            }
        },
        None => GRABKIT_ERR_INVALID_SESSION,
    })
}

/// Abort a recording, removing any partial output file.
#[no_mangle]
pub extern "C" fn grabkit_abort_recording(session: u64) -> c_int {
    guarded(|| match handle::get(session) {
        Some(session) => match session.abort() {
            Ok(()) => GRABKIT_OK,
            Err(err) => {
                warn!("abort_recording failed: {err}");
                status_code(&err)
            }
        },
        None => GRABKIT_ERR_INVALID_SESSION,
    })
}

/// Whether the session is still recording. Returns 1 or 0; unknown
/// handles report 0.
#[no_mangle]
pub extern "C" fn grabkit_is_recording(session: u64) -> c_int {
    guarded(|| match handle::get(session) {
        Some(session) if session.is_recording() => 1,
        _ => 0,
    })
}
