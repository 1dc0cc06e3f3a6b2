//! FFmpeg child-process video sink.
//!
//! Raw BGRA frames are piped to an `ffmpeg` process on stdin and encoded
//! to H.264 in an MP4 container. The binary is resolved from the
//! `GRABKIT_FFMPEG` environment variable, falling back to `ffmpeg` on
//! the PATH.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;

use tracing::{debug, info, warn};

use grabkit_capture::Frame;

use crate::error::EncoderError;
use crate::{EncoderResult, VideoSink};

const FFMPEG_ENV: &str = "GRABKIT_FFMPEG";

fn ffmpeg_program() -> String {
    std::env::var(FFMPEG_ENV).unwrap_or_else(|_| "ffmpeg".to_string())
}

/// Arguments for encoding raw BGRA stdin into an H.264 MP4 file.
fn ffmpeg_args(path: &Path, width: u32, height: u32, fps: u32) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "bgra".into(),
        "-s".into(),
        format!("{width}x{height}"),
        "-r".into(),
        fps.to_string(),
        "-i".into(),
        "-".into(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "veryfast".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-movflags".into(),
        "+faststart".into(),
        path.display().to_string(),
    ]
}

/// Records frames into an MP4 file via an ffmpeg child process.
pub struct FfmpegSink {
    child: Child,
    stdin: Option<ChildStdin>,
    path: PathBuf,
    frame_len: usize,
}

impl FfmpegSink {
    /// Spawn ffmpeg for the given output file.
    pub fn create(path: &Path, width: u32, height: u32, fps: u32) -> EncoderResult<Self> {
        let program = ffmpeg_program();
        let args = ffmpeg_args(path, width, height, fps);
        debug!(%program, ?args, "spawning ffmpeg");

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EncoderError::FfmpegSpawn { program, source })?;

        let stdin = child.stdin.take();

        Ok(Self {
            child,
            stdin,
            path: path.to_path_buf(),
            frame_len: Frame::bgra_buffer_size(width, height),
        })
    }
}

impl VideoSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame, _pts: Duration) -> EncoderResult<()> {
        if frame.data.len() != self.frame_len {
            return Err(EncoderError::FrameSize {
                expected: self.frame_len,
                actual: frame.data.len(),
            });
        }
        match self.stdin.as_mut() {
            Some(stdin) => {
                stdin.write_all(&frame.data)?;
                Ok(())
            }
            None => Err(EncoderError::FfmpegFailed("stdin already closed".into())),
        }
    }

    fn finalize(mut self: Box<Self>) -> EncoderResult<()> {
        // Closing stdin tells ffmpeg to flush its encoder and write the
        // MP4 trailer.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(EncoderError::FfmpegFailed(status.to_string()));
        }
        info!(path = %self.path.display(), "finalized MP4 recording");
        Ok(())
    }

    fn discard(mut self: Box<Self>) -> EncoderResult<()> {
        drop(self.stdin.take());
        if let Err(e) = self.child.kill() {
            warn!("failed to kill ffmpeg: {e}");
        }
        let _ = self.child.wait();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EncoderError::Io(e)),
        }
        info!(path = %self.path.display(), "discarded MP4 recording");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_describe_raw_bgra_input_and_mp4_output() {
        let args = ffmpeg_args(Path::new("/tmp/out.mp4"), 1920, 1080, 30);

        let pos = |needle: &str| args.iter().position(|a| a == needle).unwrap();
        assert_eq!(args[pos("-s") + 1], "1920x1080");
        assert_eq!(args[pos("-r") + 1], "30");
        assert_eq!(args[pos("-pix_fmt") + 1], "bgra");
        assert_eq!(args[pos("-c:v") + 1], "libx264");
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn program_defaults_to_path_lookup() {
        // The env var is test-scoped elsewhere; by default the plain
        // binary name is used.
        if std::env::var(FFMPEG_ENV).is_err() {
            assert_eq!(ffmpeg_program(), "ffmpeg");
        }
    }
}
