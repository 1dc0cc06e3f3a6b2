//! High level capture facade.
//!
//! Ties a [`CaptureBackend`] to the encoders: still captures come back
//! as encoded PNG buffers, recordings run on a worker thread writing
//! into a [`VideoSink`](grabkit_encoder::VideoSink) until stopped or
//! aborted.

mod error;
mod recording;
mod session;

pub use error::{BridgeError, BridgeResult};
pub use recording::{RecordingConfig, SessionState};
pub use session::RecordingSession;

use std::fs;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use grabkit_capture::{default_backend, CaptureBackend, CaptureOptions, CaptureTarget, Region};
use grabkit_encoder::{create_video_sink, encode_png, EncoderError};

/// Entry point for screenshots and recordings.
///
/// Cheap to clone through [`Arc`]; all methods take `&self` and the
/// backend is required to be thread safe.
pub struct CaptureBridge {
    backend: Arc<dyn CaptureBackend>,
}

impl CaptureBridge {
    /// Build a bridge around an explicit backend.
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend: Arc::from(backend),
        }
    }

    /// Build a bridge around the platform default backend.
    pub fn with_default_backend() -> Self {
        Self::new(default_backend())
    }

    /// Whether capture is usable on this machine right now.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Capture the whole virtual screen as a PNG buffer.
    #[instrument(skip(self))]
    pub fn capture_fullscreen(&self) -> BridgeResult<Vec<u8>> {
        self.capture_encoded(&CaptureTarget::FullScreen, &CaptureOptions::default())
    }

    /// Capture a rectangular region as a PNG buffer.
    ///
    /// The region must have positive width and height; the all-zero
    /// rectangle is a recording-config sentinel only and fails here
    /// like any other degenerate region.
    #[instrument(skip(self))]
    pub fn capture_region(&self, region: Region) -> BridgeResult<Vec<u8>> {
        self.capture_encoded(
            &CaptureTarget::Region(region),
            &CaptureOptions::default(),
        )
    }

    /// Capture a single window, identified by its platform id, as a
    /// PNG buffer.
    #[instrument(skip(self))]
    pub fn capture_window(&self, window_id: u32) -> BridgeResult<Vec<u8>> {
        self.capture_encoded(&CaptureTarget::Window(window_id), &CaptureOptions::default())
    }

    fn capture_encoded(
        &self,
        target: &CaptureTarget,
        options: &CaptureOptions,
    ) -> BridgeResult<Vec<u8>> {
        if !self.backend.is_available() {
            return Err(grabkit_capture::CaptureError::NotAvailable.into());
        }
        let frame = self.backend.capture(target, options)?;
        debug!(width = frame.width, height = frame.height, "frame captured");
        let png = encode_png(&frame)?;
        Ok(png)
    }

    /// Start a recording.
    ///
    /// Validates the configuration, sizes the output from the display
    /// or the clamped region, creates the output file (and any missing
    /// parent directories) and spawns the capture worker. The first
    /// frame is captured before this returns, so an `Ok` session is
    /// actually recording.
    #[instrument(skip(self, config), fields(path = %config.output_path.display(), fps = config.fps))]
    pub fn start_recording(&self, config: &RecordingConfig) -> BridgeResult<RecordingSession> {
        config.validate()?;
        if !self.backend.is_available() {
            return Err(grabkit_capture::CaptureError::NotAvailable.into());
        }

        let (display_w, display_h) = self.backend.display_size()?;
        let (width, height) = if config.region.is_zero() {
            (display_w, display_h)
        } else {
            let bounds = config.region.clamp_to_display(display_w, display_h)?;
            (bounds.width, bounds.height)
        };

        if let Some(parent) = config.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| EncoderError::CreateFile {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let sink = create_video_sink(&config.output_path, width, height, config.fps)?;
        info!(width, height, sink = sink.name(), "starting recording");
        RecordingSession::spawn(Arc::clone(&self.backend), config, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grabkit_capture::SyntheticBackend;

    #[test]
    fn capture_fullscreen_returns_png() {
        let bridge = CaptureBridge::new(Box::new(SyntheticBackend::new(64, 48)));
        let png = bridge.capture_fullscreen().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn unavailable_backend_rejects_capture() {
        let bridge = CaptureBridge::new(Box::new(SyntheticBackend::unavailable()));
        let err = bridge.capture_fullscreen().unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Capture(grabkit_capture::CaptureError::NotAvailable)
        ));
    }

    #[test]
    fn zero_region_still_capture_fails() {
        let bridge = CaptureBridge::new(Box::new(SyntheticBackend::new(64, 48)));
        let err = bridge.capture_region(Region::ZERO).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Capture(grabkit_capture::CaptureError::InvalidRegion(_))
        ));
    }

    #[test]
    fn invalid_region_is_rejected() {
        let bridge = CaptureBridge::new(Box::new(SyntheticBackend::new(64, 48)));
        let err = bridge
            .capture_region(Region {
                x: 0.0,
                y: 0.0,
                width: -5.0,
                height: 10.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Capture(grabkit_capture::CaptureError::InvalidRegion(_))
        ));
    }

    #[test]
    fn missing_window_is_reported() {
        let bridge = CaptureBridge::new(Box::new(SyntheticBackend::new(64, 48)));
        let err = bridge.capture_window(0).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Capture(grabkit_capture::CaptureError::WindowNotFound(0))
        ));
    }
}
