//! Error types for the encoder module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during encoding operations.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),

    /// GIF encoding failed.
    #[error("GIF encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),

    /// Output file could not be created.
    #[error("failed to create output file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The ffmpeg executable could not be started.
    #[error("failed to spawn ffmpeg ({program}): {source}")]
    FfmpegSpawn {
        program: String,
        source: std::io::Error,
    },

    /// ffmpeg exited unsuccessfully.
    #[error("ffmpeg exited with {0}")]
    FfmpegFailed(String),

    /// A frame did not match the sink's configured dimensions.
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    /// The sink's dimensions cannot be represented in the container.
    #[error("dimensions {width}x{height} not supported by {container}")]
    UnsupportedDimensions {
        width: u32,
        height: u32,
        container: &'static str,
    },

    /// I/O error writing to the sink.
    #[error("I/O error writing to sink: {0}")]
    Io(#[from] std::io::Error),
}
