//! Captured frame type.

use bytes::Bytes;

/// A captured frame of BGRA8 pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Tightly packed BGRA pixel data, 4 bytes per pixel.
    pub data: Bytes,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,
}

impl Frame {
    /// Create a new frame.
    pub fn new(data: Bytes, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Expected BGRA buffer size for the given dimensions.
    pub fn bgra_buffer_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    /// Validate that the frame data matches its dimensions.
    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::bgra_buffer_size(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_matches_dimensions() {
        assert_eq!(Frame::bgra_buffer_size(2, 3), 24);

        let frame = Frame::new(Bytes::from(vec![0u8; 24]), 2, 3);
        assert!(frame.is_valid());

        let short = Frame::new(Bytes::from(vec![0u8; 23]), 2, 3);
        assert!(!short.is_valid());
    }
}
