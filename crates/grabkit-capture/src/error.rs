//! Error types for the capture module.

use thiserror::Error;

/// Errors that can occur during capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Screen capture is not available on this host.
    #[error("screen capture is not available on this platform")]
    NotAvailable,

    /// The user has not authorized screen recording.
    #[error("screen recording permission denied")]
    PermissionDenied,

    /// The requested region is degenerate or outside the display.
    #[error("invalid capture region: {0}")]
    InvalidRegion(String),

    /// No window exists with the given id.
    #[error("window not found: {0}")]
    WindowNotFound(u32),

    /// The capture itself failed.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// Windows API error.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),
}
