//! Rectangular capture regions in display coordinates.

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::CaptureResult;

/// A rectangular sub-area of the display.
///
/// Coordinates are real-valued, origin at the top-left of the display.
/// The all-zero region is used as a "full screen" sentinel in recording
/// configurations; it is not a valid capture region on its own.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: f32,

    /// Top edge.
    pub y: f32,

    /// Width, must be positive for a valid region.
    pub width: f32,

    /// Height, must be positive for a valid region.
    pub height: f32,
}

/// Pixel bounds of a region after clamping to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// The all-zero sentinel region.
    pub const ZERO: Region = Region {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a new region.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this is the all-zero "full screen" sentinel.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }

    /// Validate the region geometry.
    ///
    /// All coordinates must be finite and width/height strictly positive.
    pub fn validate(&self) -> CaptureResult<()> {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        if !finite {
            return Err(CaptureError::InvalidRegion(format!(
                "non-finite coordinates ({}, {}, {}, {})",
                self.x, self.y, self.width, self.height
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CaptureError::InvalidRegion(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Clamp the region to a display of the given size and round to
    /// whole pixels.
    ///
    /// Fails when the region is invalid or does not intersect the
    /// display at all.
    pub fn clamp_to_display(&self, display_width: u32, display_height: u32) -> CaptureResult<PixelBounds> {
        self.validate()?;

        let left = self.x.max(0.0).round() as i64;
        let top = self.y.max(0.0).round() as i64;
        let right = ((self.x + self.width).min(display_width as f32)).round() as i64;
        let bottom = ((self.y + self.height).min(display_height as f32)).round() as i64;

        if right <= left || bottom <= top {
            return Err(CaptureError::InvalidRegion(format!(
                "region ({}, {}, {}x{}) does not intersect the {}x{} display",
                self.x, self.y, self.width, self.height, display_width, display_height
            )));
        }

        Ok(PixelBounds {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel() {
        assert!(Region::ZERO.is_zero());
        assert!(!Region::new(0.0, 0.0, 1.0, 1.0).is_zero());
    }

    #[test]
    fn validate_rejects_degenerate_dimensions() {
        assert!(Region::new(0.0, 0.0, 0.0, 10.0).validate().is_err());
        assert!(Region::new(0.0, 0.0, 10.0, -1.0).validate().is_err());
        assert!(Region::new(0.0, 0.0, 10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite() {
        assert!(Region::new(f32::NAN, 0.0, 10.0, 10.0).validate().is_err());
        assert!(Region::new(0.0, 0.0, f32::INFINITY, 10.0).validate().is_err());
    }

    #[test]
    fn clamp_inside_display_is_identity() {
        let bounds = Region::new(10.0, 20.0, 100.0, 50.0)
            .clamp_to_display(1920, 1080)
            .unwrap();
        assert_eq!(
            bounds,
            PixelBounds {
                x: 10,
                y: 20,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn clamp_trims_overhang() {
        let bounds = Region::new(-10.0, -20.0, 100.0, 100.0)
            .clamp_to_display(1920, 1080)
            .unwrap();
        assert_eq!(bounds.x, 0);
        assert_eq!(bounds.y, 0);
        assert_eq!(bounds.width, 90);
        assert_eq!(bounds.height, 80);
    }

    #[test]
    fn clamp_rejects_region_outside_display() {
        let err = Region::new(3000.0, 0.0, 100.0, 100.0).clamp_to_display(1920, 1080);
        assert!(err.is_err());
    }

    #[test]
    fn serde_round_trip() {
        let region = Region::new(1.5, 2.5, 640.0, 480.0);
        let json = serde_json::to_string(&region).unwrap();
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(region, back);
    }
}
