//! This module contains global constants used across the display and metrics modules.

/// The total width of the reference OLED display in pixels.
pub const DISPLAY_WIDTH: u32 = 128;
/// The total height of the reference OLED display in pixels.
pub const DISPLAY_HEIGHT: u32 = 64;

/// Default I2C bus for the Pi desktop case panel.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
/// Default SSD1306 I2C address.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Frame cadence, seconds.
pub const DEFAULT_TICK_INTERVAL_S: f64 = 0.1;
/// Metrics refresh cadence, seconds.
pub const DEFAULT_METRICS_INTERVAL_S: f64 = 1.0;
/// Time each page stays on screen, seconds.
pub const DEFAULT_PAGE_DURATION_S: f64 = 30.0;
/// Pixels the scroll offset advances per tick.
pub const DEFAULT_SCROLL_SPEED_PX: u32 = 2;
/// Blank gap between repeated copies of a scrolling line.
pub const DEFAULT_SCROLL_GAP_PX: u32 = 20;

/// Main font for the stats page (closest match to PixelOperator 16).
pub const DEFAULT_MAIN_FONT: &str = "7x14";
/// Smaller font for the icon grid.
pub const DEFAULT_SMALL_FONT: &str = "6x10";

/// Row pitch of the stats page.
pub const STATS_LINE_PITCH: i32 = 16;
/// Row pitch of the icon grid.
pub const ICON_ROW_PITCH: i32 = 18;

/// Horizontal room an icon takes in front of its text (glyph plus gap).
pub const ICON_ADVANCE: u32 = 10;
