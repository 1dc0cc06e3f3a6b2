//! Still-image PNG encoding.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use grabkit_capture::Frame;

use crate::convert::bgra_to_rgba;
use crate::error::EncoderError;
use crate::EncoderResult;

/// Encode a BGRA frame as a PNG image.
///
/// A valid frame always produces a non-empty buffer; callers rely on
/// this to uphold the "success implies non-empty buffer" contract.
pub fn encode_png(frame: &Frame) -> EncoderResult<Vec<u8>> {
    if !frame.is_valid() {
        return Err(EncoderError::FrameSize {
            expected: Frame::bgra_buffer_size(frame.width, frame.height),
            actual: frame.data.len(),
        });
    }

    let rgba = bgra_to_rgba(&frame.data);
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        &rgba,
        frame.width,
        frame.height,
        ExtendedColorType::Rgba8,
    )?;

    debug!(
        width = frame.width,
        height = frame.height,
        bytes = out.len(),
        "encoded PNG"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn test_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::new();
        for i in 0..Frame::bgra_buffer_size(width, height) {
            data.push((i % 251) as u8);
        }
        Frame::new(Bytes::from(data), width, height)
    }

    #[test]
    fn produces_decodable_png() {
        let png = encode_png(&test_frame(16, 9)).unwrap();
        assert!(!png.is_empty());
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 9));
    }

    #[test]
    fn round_trips_pixel_values() {
        let frame = test_frame(4, 4);
        let png = encode_png(&frame).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();

        // BGRA (1, 2, 3, 4) comes back as RGBA (3, 2, 1, 4).
        let px = decoded.get_pixel(0, 0);
        assert_eq!(px.0, [frame.data[2], frame.data[1], frame.data[0], frame.data[3]]);
    }

    #[test]
    fn rejects_truncated_frame() {
        let frame = Frame::new(Bytes::from(vec![0u8; 10]), 16, 9);
        assert!(matches!(
            encode_png(&frame),
            Err(EncoderError::FrameSize { .. })
        ));
    }
}
