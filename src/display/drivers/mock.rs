/*
 *  display/drivers/mock.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory frame sink for tests and headless runs
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

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{check_frame, rotated_size, DisplayCapabilities, FrameSink};

/// Mock display driver
///
/// This driver simulates a display without requiring hardware. It's useful for:
/// - Unit and integration tests
/// - Running the render loop on a development machine (`driver: headless`)
///
/// Every operation is recorded in a shared [`MockDriverState`] so a test can
/// keep a handle to it after the driver has been boxed into the scheduler.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Unrotated panel size
    native: (u32, u32),

    /// Rotation applied by init()
    rotate_deg: Option<u16>,

    /// Shared state for inspection
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of frames accepted by present()
    pub present_count: usize,

    /// Number of times blank() was called
    pub blank_count: usize,

    /// Last brightness value set
    pub last_brightness: Option<u8>,

    /// Last rotation set
    pub last_rotation: Option<u16>,

    /// Last invert state set
    pub last_invert: Option<bool>,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Copy of the most recently presented frame
    pub last_frame: Option<FrameBuffer>,

    /// Simulate failures (for error testing)
    pub simulate_present_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    /// Create a new mock driver sized from the display configuration.
    /// Like a real panel, a configured rotation takes effect in `init()`.
    pub fn new(config: &DisplayConfig) -> Self {
        let native = (config.width_or_default(), config.height_or_default());
        let capabilities = DisplayCapabilities {
            width: native.0,
            height: native.1,
            supports_rotation: true,
            max_fps: 60,
            supports_brightness: true,
            supports_invert: true,
        };

        Self {
            capabilities,
            native,
            rotate_deg: config.rotate_deg,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Self {
        let config = DisplayConfig {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        Self::new(&config)
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    // a panicking test thread must not take every later assertion with it
    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn present_count(&self) -> usize {
        self.lock().present_count
    }

    /// Copy of the last presented frame
    pub fn last_frame(&self) -> Option<FrameBuffer> {
        self.lock().last_frame.clone()
    }

    /// Save the last presented frame as a plain PBM (for visual debugging)
    pub fn save_to_pbm(&self, path: &Path) -> std::io::Result<()> {
        let state = self.lock();
        let Some(frame) = state.last_frame.as_ref() else {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no frame presented yet"));
        };

        let mut file = std::fs::File::create(path)?;

        // PBM header
        writeln!(file, "P1")?;
        writeln!(file, "{} {}", frame.width(), frame.height())?;

        // Pixel data
        let width = frame.width() as usize;
        for (i, pixel) in frame.as_slice().iter().enumerate() {
            write!(file, "{}", if pixel.is_on() { "1" } else { "0" })?;
            if (i + 1) % width == 0 {
                writeln!(file)?;
            } else {
                write!(file, " ")?;
            }
        }

        Ok(())
    }
}

impl FrameSink for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.lock();

            if state.simulate_init_failure {
                return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
            }

            state.init_count += 1;
            state.is_initialized = true;
        }
        if let Some(rotation) = self.rotate_deg {
            self.set_rotation(rotation)?;
        }
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        check_frame(&self.capabilities, frame)?;
        let mut state = self.lock();

        if state.simulate_present_failure {
            return Err(DisplayError::Other("Simulated present failure".to_string()));
        }

        state.present_count += 1;
        match state.last_frame.as_mut() {
            Some(last) => last.clone_from(frame),
            None => state.last_frame = Some(frame.clone()),
        }
        if state.present_count % 100 == 0 {
            debug!("Mock display presented {} frames", state.present_count);
        }
        Ok(())
    }

    fn blank(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.blank_count += 1;
        let (w, h) = (self.capabilities.width, self.capabilities.height);
        state.last_frame = Some(FrameBuffer::new(w, h));
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.lock().last_brightness = Some(value);
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.lock().last_invert = Some(inverted);
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if degrees != 0 && degrees != 90 && degrees != 180 && degrees != 270 {
            return Err(DisplayError::InvalidRotation(degrees));
        }
        let (width, height) = rotated_size(self.native.0, self.native.1, degrees);
        self.capabilities.width = width;
        self.capabilities.height = height;
        self.lock().last_rotation = Some(degrees);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use tempfile::TempDir;

    fn drawn_frame() -> FrameBuffer {
        let mut fb = FrameBuffer::new(128, 64);
        Line::new(Point::new(0, 0), Point::new(10, 10))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        fb
    }

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new_with_size(128, 64);
        assert_eq!(driver.capabilities().width, 128);
        assert_eq!(driver.capabilities().height, 64);
        assert!(driver.last_frame().is_none());
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(128, 64);

        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_driver_present_records_frame() {
        let mut driver = MockDriver::new_with_size(128, 64);
        let frame = drawn_frame();
        driver.present(&frame).unwrap();

        assert_eq!(driver.present_count(), 1);
        assert_eq!(driver.last_frame(), Some(frame));
    }

    #[test]
    fn test_mock_driver_blank() {
        let mut driver = MockDriver::new_with_size(128, 64);
        driver.present(&drawn_frame()).unwrap();
        driver.blank().unwrap();

        assert_eq!(driver.last_frame().map(|f| f.count_on()), Some(0));
        assert_eq!(driver.state().lock().unwrap().blank_count, 1);
    }

    #[test]
    fn test_mock_driver_rotation() {
        let mut driver = MockDriver::new_with_size(128, 64);

        driver.set_rotation(90).unwrap();
        assert_eq!(driver.state().lock().unwrap().last_rotation, Some(90));
        assert_eq!(driver.dimensions(), (64, 128));

        // Invalid rotation should fail and keep the geometry
        assert!(driver.set_rotation(45).is_err());
        assert_eq!(driver.dimensions(), (64, 128));

        driver.set_rotation(180).unwrap();
        assert_eq!(driver.dimensions(), (128, 64));
    }

    #[test]
    fn test_configured_rotation_applies_on_init() {
        let config = DisplayConfig {
            rotate_deg: Some(270),
            ..Default::default()
        };
        let mut driver = MockDriver::new(&config);
        assert_eq!(driver.dimensions(), (128, 64));

        driver.init().unwrap();
        assert_eq!(driver.dimensions(), (64, 128));
        assert!(driver.present(&FrameBuffer::new(64, 128)).is_ok());
        assert!(driver.present(&drawn_frame()).is_err());
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new_with_size(128, 64);
        driver.state().lock().unwrap().simulate_present_failure = true;
        assert!(driver.present(&drawn_frame()).is_err());

        driver.state().lock().unwrap().simulate_present_failure = false;
        assert!(driver.present(&drawn_frame()).is_ok());
    }

    #[test]
    fn test_mock_driver_frame_size_mismatch() {
        let mut driver = MockDriver::new_with_size(128, 64);
        let err = driver.present(&FrameBuffer::new(128, 32)).unwrap_err();
        assert!(matches!(err, DisplayError::FrameSizeMismatch { .. }));
        assert_eq!(driver.present_count(), 0);
    }

    #[test]
    fn test_mock_driver_save_pbm() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.pbm");
        let mut driver = MockDriver::new_with_size(128, 64);
        assert!(driver.save_to_pbm(&path).is_err());

        driver.present(&drawn_frame()).unwrap();
        driver.save_to_pbm(&path).unwrap();
        let pbm = std::fs::read_to_string(&path).unwrap();
        assert!(pbm.starts_with("P1\n128 64\n1 0 0"));
    }
}
