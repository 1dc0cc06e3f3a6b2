//! Status codes returned across the C ABI.

use std::ffi::{c_char, c_int, CStr};

use grabkit_bridge::BridgeError;
use grabkit_capture::CaptureError;
use grabkit_encoder::EncoderError;

/// The operation succeeded.
pub const GRABKIT_OK: c_int = 0;

/// Capture is not available on this host.
pub const GRABKIT_ERR_NOT_AVAILABLE: c_int = -1;

/// Screen capture permission was denied.
pub const GRABKIT_ERR_PERMISSION_DENIED: c_int = -2;

/// Frame acquisition failed, or the request itself was invalid.
pub const GRABKIT_ERR_CAPTURE_FAILED: c_int = -3;

/// Encoding the captured pixels failed.
pub const GRABKIT_ERR_ENCODING_FAILED: c_int = -4;

/// The output file could not be created.
pub const GRABKIT_ERR_FILE_CREATE_FAILED: c_int = -5;

/// Unknown session handle, or the session is not in a state that
/// permits the operation.
pub const GRABKIT_ERR_INVALID_SESSION: c_int = -6;

/// Map a bridge error onto its ABI status code.
pub(crate) fn status_code(err: &BridgeError) -> c_int {
    match err {
        BridgeError::Capture(capture) => match capture {
            CaptureError::NotAvailable => GRABKIT_ERR_NOT_AVAILABLE,
            CaptureError::PermissionDenied => GRABKIT_ERR_PERMISSION_DENIED,
            CaptureError::InvalidRegion(_)
            | CaptureError::WindowNotFound(_)
            | CaptureError::CaptureFailed(_) => GRABKIT_ERR_CAPTURE_FAILED,
            #[cfg(windows)]
            CaptureError::WindowsApi(_) => GRABKIT_ERR_CAPTURE_FAILED,
        },
        BridgeError::Encode(encode) => match encode {
            EncoderError::CreateFile { .. } | EncoderError::FfmpegSpawn { .. } => {
                GRABKIT_ERR_FILE_CREATE_FAILED
            }
            _ => GRABKIT_ERR_ENCODING_FAILED,
        },
        BridgeError::InvalidConfig(_) | BridgeError::Worker(_) => GRABKIT_ERR_CAPTURE_FAILED,
        BridgeError::InvalidState { .. } => GRABKIT_ERR_INVALID_SESSION,
    }
}

fn message(status: c_int) -> &'static CStr {
    match status {
        GRABKIT_OK => c"Success",
        GRABKIT_ERR_NOT_AVAILABLE => c"Screen capture is not available",
        GRABKIT_ERR_PERMISSION_DENIED => c"Screen capture permission denied",
        GRABKIT_ERR_CAPTURE_FAILED => c"Capture failed",
        GRABKIT_ERR_ENCODING_FAILED => c"Encoding failed",
        GRABKIT_ERR_FILE_CREATE_FAILED => c"Failed to create output file",
        GRABKIT_ERR_INVALID_SESSION => c"Invalid recording session",
        _ => c"Unknown error",
    }
}

/// Human-readable description of a status code.
///
/// The returned pointer is a static NUL-terminated string; callers must
/// not free it.
#[no_mangle]
pub extern "C" fn grabkit_status_message(status: c_int) -> *const c_char {
    message(status).as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_distinct_message() {
        let codes = [
            GRABKIT_OK,
            GRABKIT_ERR_NOT_AVAILABLE,
            GRABKIT_ERR_PERMISSION_DENIED,
            GRABKIT_ERR_CAPTURE_FAILED,
            GRABKIT_ERR_ENCODING_FAILED,
            GRABKIT_ERR_FILE_CREATE_FAILED,
            GRABKIT_ERR_INVALID_SESSION,
        ];
        let mut seen = Vec::new();
        for code in codes {
            let msg = message(code).to_str().unwrap();
            assert!(!msg.is_empty());
            assert!(!seen.contains(&msg));
            seen.push(msg);
        }
        assert_eq!(message(-99).to_str().unwrap(), "Unknown error");
    }

    #[test]
    fn error_mapping() {
        assert_eq!(
            status_code(&BridgeError::Capture(CaptureError::NotAvailable)),
            GRABKIT_ERR_NOT_AVAILABLE
        );
        assert_eq!(
            status_code(&BridgeError::Capture(CaptureError::PermissionDenied)),
            GRABKIT_ERR_PERMISSION_DENIED
        );
        assert_eq!(
            status_code(&BridgeError::Capture(CaptureError::WindowNotFound(7))),
            GRABKIT_ERR_CAPTURE_FAILED
        );
        assert_eq!(
            status_code(&BridgeError::InvalidState {
                operation: "stop",
                state: "finalized",
            }),
            GRABKIT_ERR_INVALID_SESSION
        );
        assert_eq!(
            status_code(&BridgeError::InvalidConfig("bad".into())),
            GRABKIT_ERR_CAPTURE_FAILED
        );
    }
}
