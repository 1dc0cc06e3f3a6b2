//! Recording configuration and session states.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use grabkit_capture::Region;

use crate::error::BridgeError;
use crate::BridgeResult;

/// Configuration for starting a recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Destination file. The extension selects the container
    /// (`.gif` for animated GIF, anything else for MP4 via ffmpeg).
    pub output_path: PathBuf,

    /// Region to record. [`Region::ZERO`] means the full screen.
    pub region: Region,

    /// Target frame rate, must be positive.
    pub fps: u32,

    /// Composite the cursor into recorded frames.
    pub show_cursor: bool,
}

impl RecordingConfig {
    /// Full-screen recording with the cursor shown.
    pub fn fullscreen(output_path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            output_path: output_path.into(),
            region: Region::ZERO,
            fps,
            show_cursor: true,
        }
    }

    /// Restrict the recording to a region of the display.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Hide or show the cursor in recorded frames.
    pub fn with_cursor(mut self, show_cursor: bool) -> Self {
        self.show_cursor = show_cursor;
        self
    }

    pub(crate) fn validate(&self) -> BridgeResult<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(BridgeError::InvalidConfig("empty output path".into()));
        }
        if self.fps == 0 {
            return Err(BridgeError::InvalidConfig(
                "frame rate must be positive".into(),
            ));
        }
        if !self.region.is_zero() {
            self.region.validate()?;
        }
        Ok(())
    }
}

/// State of a recording session.
///
/// Sessions start `Active` and move to exactly one terminal state:
/// `Finalized` via stop, `Aborted` via abort, or `Failed` when the
/// worker or the sink errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Frames are being captured and written.
    Active,

    /// Stopped; the output file is sealed and playable.
    Finalized,

    /// Aborted; any partial output was removed.
    Aborted,

    /// The worker or sink failed; any partial output was removed.
    Failed,
}

impl SessionState {
    /// Simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finalized => "finalized",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }

    /// Whether no further stop/abort transitions are possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}
