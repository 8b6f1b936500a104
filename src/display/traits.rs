/*
 *  display/traits.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame sink abstraction shared by all display drivers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Whether the display supports hardware rotation
    pub supports_rotation: bool,

    /// Maximum recommended frame rate
    pub max_fps: u32,

    /// Whether the display supports brightness control
    pub supports_brightness: bool,

    /// Whether the display supports inversion
    pub supports_invert: bool,
}

/// Destination for fully composed monochrome frames.
///
/// Dimensions are fixed once the sink is initialised, with any configured
/// rotation applied; every frame handed to [`FrameSink::present`] must
/// match them. There are no partial or windowed updates.
pub trait FrameSink: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a complete frame to the panel
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;

    /// Clear the display to blank/off state
    fn blank(&mut self) -> Result<(), DisplayError>;

    /// Set display brightness (0-255)
    fn set_brightness(&mut self, _value: u8) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Set display inversion (if supported)
    fn set_invert(&mut self, _inverted: bool) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Set display rotation (if supported)
    ///
    /// Rotation angle should be 0, 90, 180, or 270 degrees.
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if !self.capabilities().supports_rotation {
            return Err(DisplayError::UnsupportedOperation);
        }
        if degrees != 0 && degrees != 90 && degrees != 180 && degrees != 270 {
            return Err(DisplayError::InvalidRotation(degrees));
        }
        Err(DisplayError::UnsupportedOperation)
    }
}

/// Drawable (width, height) of a `width` x `height` panel turned by `degrees`.
pub fn rotated_size(width: u32, height: u32, degrees: u16) -> (u32, u32) {
    match degrees {
        90 | 270 => (height, width),
        _ => (width, height),
    }
}

/// Check a frame against the sink geometry before pushing it.
pub fn check_frame(caps: &DisplayCapabilities, frame: &FrameBuffer) -> Result<(), DisplayError> {
    let actual = frame.dimensions();
    let expected = (caps.width, caps.height);
    if actual != expected {
        return Err(DisplayError::FrameSizeMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_size_swaps_on_quarter_turns() {
        assert_eq!(rotated_size(128, 64, 0), (128, 64));
        assert_eq!(rotated_size(128, 64, 90), (64, 128));
        assert_eq!(rotated_size(128, 64, 180), (128, 64));
        assert_eq!(rotated_size(128, 32, 270), (32, 128));
    }

    #[test]
    fn test_check_frame_rejects_unrotated_frame() {
        let (width, height) = rotated_size(128, 64, 90);
        let caps = DisplayCapabilities {
            width,
            height,
            supports_rotation: true,
            max_fps: 30,
            supports_brightness: true,
            supports_invert: true,
        };
        assert!(check_frame(&caps, &FrameBuffer::new(64, 128)).is_ok());
        assert!(matches!(
            check_frame(&caps, &FrameBuffer::new(128, 64)),
            Err(DisplayError::FrameSizeMismatch { expected: (64, 128), actual: (128, 64) })
        ));
    }
}
