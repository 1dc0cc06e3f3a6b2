//! Screen capture backends for the grabkit bridge.
//!
//! This crate provides the pixel-acquisition layer: a [`CaptureBackend`]
//! trait, the BGRA [`Frame`] type, region geometry, and the concrete
//! backends (Windows GDI, plus a deterministic synthetic backend used in
//! tests and headless environments).

mod error;
mod frame;
mod platform;
mod region;
pub mod synthetic;

pub use error::CaptureError;
pub use frame::Frame;
pub use region::{PixelBounds, Region};
pub use synthetic::{FailureMode, SyntheticBackend};

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// What to capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureTarget {
    /// The entire display.
    FullScreen,

    /// A rectangular sub-area of the display.
    Region(Region),

    /// A single window identified by its platform window id.
    Window(u32),
}

/// Per-capture options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    /// Composite the cursor into the captured pixels.
    ///
    /// Still captures leave this off; recording honors the configured
    /// cursor-visibility flag.
    pub include_cursor: bool,
}

/// A source of raw BGRA frames.
///
/// Implementations must be callable from any thread; recording workers
/// capture from a background thread while still captures run on the
/// caller's thread.
pub trait CaptureBackend: Send + Sync {
    /// Whether this backend can capture on the current host.
    ///
    /// Idempotent and side-effect free. `false` means every capture call
    /// will fail with [`CaptureError::NotAvailable`].
    fn is_available(&self) -> bool;

    /// Size of the display in pixels.
    fn display_size(&self) -> CaptureResult<(u32, u32)>;

    /// Capture a single frame of the given target.
    fn capture(&self, target: &CaptureTarget, options: &CaptureOptions) -> CaptureResult<Frame>;
}

/// Create the capture backend for the current platform.
///
/// On unsupported platforms this returns a stub whose `is_available`
/// reports `false` and whose captures fail with
/// [`CaptureError::NotAvailable`].
pub fn default_backend() -> Box<dyn CaptureBackend> {
    platform::default_backend()
}
