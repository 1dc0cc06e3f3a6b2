//! Stub backend for platforms without a capture implementation.

use crate::error::CaptureError;
use crate::frame::Frame;
use crate::{CaptureBackend, CaptureOptions, CaptureResult, CaptureTarget};

/// Backend used where no platform capture path exists.
///
/// Availability always reports `false` and every capture fails with
/// [`CaptureError::NotAvailable`], matching the ABI contract for hosts
/// below the capture preconditions.
pub struct UnsupportedBackend;

impl CaptureBackend for UnsupportedBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn display_size(&self) -> CaptureResult<(u32, u32)> {
        Err(CaptureError::NotAvailable)
    }

    fn capture(&self, _target: &CaptureTarget, _options: &CaptureOptions) -> CaptureResult<Frame> {
        Err(CaptureError::NotAvailable)
    }
}
