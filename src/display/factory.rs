/*
 *  display/factory.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the configured frame sink
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

use crate::config::{DisplayConfig, DriverKind, BusConfig};
use crate::display::drivers::mock::MockDriver;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::FrameSink;
use log::info;

#[cfg(feature = "driver-ssd1306")]
use crate::display::drivers::ssd1306::Ssd1306Driver;

/// Type alias for boxed frame sink trait objects
pub type BoxedSink = Box<dyn FrameSink>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a frame sink from configuration
    ///
    /// A missing driver means the SSD1306 on the default I2C bus, the
    /// panel found on the Pi desktop case. The sink is returned
    /// uninitialised; call [`FrameSink::init`] before presenting.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     driver: Some(DriverKind::Headless),
    ///     ..Default::default()
    /// };
    ///
    /// let sink = DisplayDriverFactory::create_from_config(&config)?;
    /// ```
    pub fn create_from_config(
        config: &DisplayConfig
    ) -> Result<BoxedSink, DisplayFactoryError> {
        Self::validate_config(config)?;
        let driver_kind = config.driver.unwrap_or_default();

        match driver_kind {
            DriverKind::Headless => {
                info!(
                    "Headless display ({}x{}), frames stay in memory",
                    config.width_or_default(),
                    config.height_or_default()
                );
                Ok(Box::new(MockDriver::new(config)))
            }
            DriverKind::Ssd1306 => Self::create_ssd1306(config),
        }
    }

    #[cfg(feature = "driver-ssd1306")]
    fn create_ssd1306(config: &DisplayConfig) -> Result<BoxedSink, DisplayFactoryError> {
        match config.bus_or_default() {
            BusConfig::I2c { bus, address, .. } => {
                Ok(Box::new(Ssd1306Driver::new_i2c(&bus, address, config)?))
            }
        }
    }

    #[cfg(not(feature = "driver-ssd1306"))]
    fn create_ssd1306(_config: &DisplayConfig) -> Result<BoxedSink, DisplayFactoryError> {
        Err(DisplayFactoryError::DriverNotCompiled("ssd1306".to_string()))
    }

    /// Validate a configuration without creating a driver
    ///
    /// This is useful for checking configuration at startup before attempting
    /// to initialize hardware.
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayFactoryError> {
        let (width, height) = (config.width_or_default(), config.height_or_default());
        if width == 0 || height == 0 {
            return Err(DisplayFactoryError::ConfigError(
                format!("Invalid display size {}x{}", width, height)
            ));
        }

        if let Some(rotation) = config.rotate_deg {
            if rotation != 0 && rotation != 90 && rotation != 180 && rotation != 270 {
                return Err(DisplayFactoryError::ConfigError(
                    format!("Invalid rotation angle: {} (must be 0, 90, 180, or 270)", rotation)
                ));
            }
        }

        if let (DriverKind::Headless, Some(_)) = (config.driver.unwrap_or_default(), config.bus.as_ref()) {
            return Err(DisplayFactoryError::UnsupportedCombination);
        }

        Ok(())
    }
}
