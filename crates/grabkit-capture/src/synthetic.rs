//! Deterministic synthetic capture backend.
//!
//! Produces gradient frames without touching any display API. Used by the
//! test suites, and selectable at the ABI via `GRABKIT_BACKEND=synthetic`
//! for host-side smoke tests on machines without a capturable display.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::error::CaptureError;
use crate::frame::Frame;
use crate::{CaptureBackend, CaptureOptions, CaptureResult, CaptureTarget};

/// Failure mode injected into a [`SyntheticBackend`] for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every capture fails with [`CaptureError::PermissionDenied`].
    PermissionDenied,

    /// Every capture fails with [`CaptureError::CaptureFailed`].
    CaptureFailed,
}

/// A capture backend that renders deterministic gradient frames.
#[derive(Debug, Clone)]
pub struct SyntheticBackend {
    width: u32,
    height: u32,
    available: bool,
    failure: Option<FailureMode>,
    captures_left: Option<Arc<AtomicU32>>,
}

impl SyntheticBackend {
    /// Create a backend with the given virtual display size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            failure: None,
            captures_left: None,
        }
    }

    /// A backend that reports capture as unavailable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// A backend whose captures fail with the given mode.
    pub fn failing(mode: FailureMode) -> Self {
        Self {
            failure: Some(mode),
            ..Self::default()
        }
    }

    /// A backend whose captures succeed `frames` times and fail with
    /// [`CaptureError::CaptureFailed`] from then on. Clones share the
    /// countdown.
    pub fn failing_after(frames: u32) -> Self {
        Self {
            captures_left: Some(Arc::new(AtomicU32::new(frames))),
            ..Self::default()
        }
    }

    fn render(&self, origin_x: i32, origin_y: i32, width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity(Frame::bgra_buffer_size(width, height));
        for row in 0..height {
            for col in 0..width {
                let x = origin_x as i64 + col as i64;
                let y = origin_y as i64 + row as i64;
                // Gradient keyed to absolute display coordinates so a
                // region capture matches the same pixels of a full-screen
                // capture.
                data.push((x & 0xFF) as u8); // B
                data.push((y & 0xFF) as u8); // G
                data.push(((x + y) & 0xFF) as u8); // R
                data.push(0xFF); // A
            }
        }
        Frame::new(Bytes::from(data), width, height)
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl CaptureBackend for SyntheticBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn display_size(&self) -> CaptureResult<(u32, u32)> {
        if !self.available {
            return Err(CaptureError::NotAvailable);
        }
        Ok((self.width, self.height))
    }

    fn capture(&self, target: &CaptureTarget, _options: &CaptureOptions) -> CaptureResult<Frame> {
        if !self.available {
            return Err(CaptureError::NotAvailable);
        }
        match self.failure {
            Some(FailureMode::PermissionDenied) => return Err(CaptureError::PermissionDenied),
            Some(FailureMode::CaptureFailed) => {
                return Err(CaptureError::CaptureFailed("injected failure".into()))
            }
            None => {}
        }
        if let Some(left) = &self.captures_left {
            let exhausted = left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err();
            if exhausted {
                return Err(CaptureError::CaptureFailed("injected failure".into()));
            }
        }

        match target {
            CaptureTarget::FullScreen => Ok(self.render(0, 0, self.width, self.height)),
            CaptureTarget::Region(region) => {
                let bounds = region.clamp_to_display(self.width, self.height)?;
                Ok(self.render(bounds.x, bounds.y, bounds.width, bounds.height))
            }
            CaptureTarget::Window(0) => Err(CaptureError::WindowNotFound(0)),
            CaptureTarget::Window(_) => Ok(self.render(0, 0, 640, 480)),
        }
    }
}
