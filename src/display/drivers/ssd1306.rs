/*
 *  display/drivers/ssd1306.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED display driver implementation
 *
 */

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::*,
    size::{DisplaySize128x64, DisplaySize128x32},
    I2CDisplayInterface,
    Ssd1306,
};
// glob above is shadowed by our own DisplayConfig, keep the panel trait for init()
use ssd1306::prelude::DisplayConfig as _;

use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::BinaryColor;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{check_frame, DisplayCapabilities, FrameSink};

use log::{debug, info};

/// SSD1306 display driver wrapper
pub struct Ssd1306Driver {
    /// The underlying ssd1306 driver
    display: Ssd1306Variants,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Panel options applied once the controller is up
    brightness: Option<u8>,
    invert: Option<bool>,
    rotate_deg: Option<u16>,
}

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>),
    Size128x32(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>),
}

// both variants expose the same API, only the size type differs
macro_rules! with_panel {
    ($variants:expr, $panel:ident => $body:expr) => {
        match $variants {
            Ssd1306Variants::Size128x64($panel) => $body,
            Ssd1306Variants::Size128x32($panel) => $body,
        }
    };
}

fn brightness_level(value: u8) -> Brightness {
    match value {
        0..=63 => Brightness::DIMMEST,
        64..=127 => Brightness::DIM,
        128..=191 => Brightness::NORMAL,
        _ => Brightness::BRIGHTEST,
    }
}

impl Ssd1306Driver {
    /// Create a new SSD1306 driver using I2C
    ///
    /// # Arguments
    ///
    /// * `i2c_bus_path` - Path to I2C device (e.g., "/dev/i2c-1")
    /// * `address` - I2C address (typically 0x3C or 0x3D)
    /// * `config` - Display configuration
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        info!("Opening SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let width = config.width_or_default();
        let height = config.height_or_default();

        let display = match (width, height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            _ => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", width, height)
                ));
            }
        };

        let capabilities = DisplayCapabilities {
            width,
            height,
            supports_rotation: true,
            max_fps: 30, // I2C is slower
            supports_brightness: true,
            supports_invert: true,
        };

        Ok(Self {
            display,
            capabilities,
            brightness: config.brightness,
            invert: config.invert,
            rotate_deg: config.rotate_deg,
        })
    }
}

impl FrameSink for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => panel.init())
            .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))?;

        if let Some(brightness) = self.brightness {
            self.set_brightness(brightness)?;
        }
        if let Some(invert) = self.invert {
            self.set_invert(invert)?;
        }
        if let Some(rotation) = self.rotate_deg {
            self.set_rotation(rotation)?;
        }

        info!(
            "SSD1306 initialized successfully ({}x{})",
            self.capabilities.width, self.capabilities.height
        );
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        check_frame(&self.capabilities, frame)?;
        with_panel!(&mut self.display, panel => {
            panel.draw_iter(frame.pixels())?;
            panel.flush()?;
        });
        Ok(())
    }

    fn blank(&mut self) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => {
            DrawTarget::clear(panel, BinaryColor::Off)?;
            panel.flush()?;
        });
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let level = brightness_level(value);
        with_panel!(&mut self.display, panel => panel.set_brightness(level))?;
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => panel.set_invert(inverted))?;
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = match degrees {
            0 => DisplayRotation::Rotate0,
            90 => DisplayRotation::Rotate90,
            180 => DisplayRotation::Rotate180,
            270 => DisplayRotation::Rotate270,
            _ => return Err(DisplayError::InvalidRotation(degrees)),
        };
        with_panel!(&mut self.display, panel => panel.set_rotation(rotation))?;

        // quarter turns swap the drawing area
        let size = with_panel!(&self.display, panel => OriginDimensions::size(panel));
        self.capabilities.width = size.width;
        self.capabilities.height = size.height;
        debug!("SSD1306 rotated {} degrees, drawing {}x{}", degrees, size.width, size.height);
        Ok(())
    }
}
