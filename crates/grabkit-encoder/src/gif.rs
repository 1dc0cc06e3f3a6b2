//! Animated GIF video sink.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gif::{Encoder, Repeat};
use tracing::{debug, info};

use grabkit_capture::Frame;

use crate::convert::bgra_to_rgba;
use crate::error::EncoderError;
use crate::{EncoderResult, VideoSink};

/// Records frames into an animated GIF file.
pub struct GifSink {
    encoder: Option<Encoder<BufWriter<File>>>,
    path: PathBuf,
    width: u16,
    height: u16,
    delay_cs: u16,
    frames_written: u64,
}

impl GifSink {
    /// Create the output file and write the GIF header.
    pub fn create(path: &Path, width: u32, height: u32, fps: u32) -> EncoderResult<Self> {
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(EncoderError::UnsupportedDimensions {
                width,
                height,
                container: "GIF",
            });
        }

        let file = File::create(path).map_err(|source| EncoderError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;

        let mut encoder = Encoder::new(BufWriter::new(file), width as u16, height as u16, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;

        // GIF frame delay is in centiseconds; clamp so high frame rates
        // still advance.
        let delay_cs = (100 / fps.max(1)).max(1) as u16;

        debug!(path = %path.display(), width, height, fps, "created GIF sink");
        Ok(Self {
            encoder: Some(encoder),
            path: path.to_path_buf(),
            width: width as u16,
            height: height as u16,
            delay_cs,
            frames_written: 0,
        })
    }
}

impl VideoSink for GifSink {
    fn write_frame(&mut self, frame: &Frame, _pts: Duration) -> EncoderResult<()> {
        let expected = Frame::bgra_buffer_size(self.width as u32, self.height as u32);
        if frame.data.len() != expected {
            return Err(EncoderError::FrameSize {
                expected,
                actual: frame.data.len(),
            });
        }

        let mut rgba = bgra_to_rgba(&frame.data);
        let mut gif_frame = gif::Frame::from_rgba_speed(self.width, self.height, &mut rgba, 10);
        gif_frame.delay = self.delay_cs;

        if let Some(encoder) = self.encoder.as_mut() {
            encoder.write_frame(&gif_frame)?;
            self.frames_written += 1;
        }
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> EncoderResult<()> {
        // Dropping the encoder writes the GIF trailer and flushes the
        // buffered writer.
        drop(self.encoder.take());
        info!(
            path = %self.path.display(),
            frames = self.frames_written,
            "finalized GIF recording"
        );
        Ok(())
    }

    fn discard(mut self: Box<Self>) -> EncoderResult<()> {
        drop(self.encoder.take());
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EncoderError::Io(e)),
        }
        info!(path = %self.path.display(), "discarded GIF recording");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gif"
    }
}
