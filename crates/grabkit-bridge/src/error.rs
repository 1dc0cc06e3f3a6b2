//! Error types for the bridge facade.

use thiserror::Error;

use grabkit_capture::CaptureError;
use grabkit_encoder::EncoderError;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced by bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A capture backend failure.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// An encoding or sink failure.
    #[error(transparent)]
    Encode(#[from] EncoderError),

    /// The recording configuration is invalid.
    #[error("invalid recording config: {0}")]
    InvalidConfig(String),

    /// The operation is not valid in the session's current state.
    #[error("cannot {operation} a {state} recording session")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The recording worker thread failed out of band.
    #[error("recording worker failed: {0}")]
    Worker(String),
}
