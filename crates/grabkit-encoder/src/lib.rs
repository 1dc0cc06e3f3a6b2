//! PNG encoding and video sinks for the grabkit bridge.
//!
//! Still captures are encoded with [`encode_png`]. Recordings write
//! through a [`VideoSink`]: an animated-GIF sink (pure Rust) or an
//! ffmpeg child process producing H.264 MP4, selected by the output
//! file's extension.

mod convert;
mod error;
mod ffmpeg;
mod gif;
mod png;

pub use error::EncoderError;
pub use ffmpeg::FfmpegSink;
pub use gif::GifSink;
pub use png::encode_png;

use std::path::Path;
use std::time::Duration;

use tracing::info;

use grabkit_capture::Frame;

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// A destination for recorded video frames.
///
/// Exactly one of [`finalize`](VideoSink::finalize) (seal the output
/// into a valid, playable file) or [`discard`](VideoSink::discard)
/// (terminate and remove any partial output) consumes the sink.
pub trait VideoSink: Send {
    /// Append one frame with its presentation timestamp.
    fn write_frame(&mut self, frame: &Frame, pts: Duration) -> EncoderResult<()>;

    /// Complete the recording so the output file is valid and playable.
    fn finalize(self: Box<Self>) -> EncoderResult<()>;

    /// Terminate the recording and remove any partial output file.
    fn discard(self: Box<Self>) -> EncoderResult<()>;

    /// Sink name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Create the video sink for the given output path.
///
/// `.gif` paths record an animated GIF; everything else goes through
/// ffmpeg into an H.264 MP4.
pub fn create_video_sink(
    path: &Path,
    width: u32,
    height: u32,
    fps: u32,
) -> EncoderResult<Box<dyn VideoSink>> {
    let is_gif = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gif"))
        .unwrap_or(false);

    let sink: Box<dyn VideoSink> = if is_gif {
        Box::new(GifSink::create(path, width, height, fps)?)
    } else {
        Box::new(FfmpegSink::create(path, width, height, fps)?)
    };

    info!(
        sink = sink.name(),
        path = %path.display(),
        width,
        height,
        fps,
        "created video sink"
    );
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gif_extension_selects_gif_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = create_video_sink(&dir.path().join("clip.GIF"), 8, 8, 10).unwrap();
        assert_eq!(sink.name(), "gif");
        sink.discard().unwrap();
    }
}
