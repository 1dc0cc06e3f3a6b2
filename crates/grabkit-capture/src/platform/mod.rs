//! Platform capture backends.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::GdiBackend;

#[cfg(not(windows))]
mod unsupported;

#[cfg(not(windows))]
pub use unsupported::UnsupportedBackend;

use crate::CaptureBackend;

/// Create the backend for the current platform.
#[cfg(windows)]
pub(crate) fn default_backend() -> Box<dyn CaptureBackend> {
    Box::new(GdiBackend::new())
}

/// Create the backend for the current platform (unsupported stub).
#[cfg(not(windows))]
pub(crate) fn default_backend() -> Box<dyn CaptureBackend> {
    Box::new(UnsupportedBackend)
}
