/*
 *  glyphs.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  8x8 metric icons for the icon page
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

use serde::{Deserialize, Serialize};

/// The width of standard 8x8 glyphs.
pub const GLYPH_WIDTH: u32 = 8;
/// The height of standard 8x8 glyphs.
pub const GLYPH_HEIGHT: u32 = 8;

// one byte per row, MSB is the leftmost pixel
pub const GLYPH_TEMP: [u8; 8] = [0x18, 0x24, 0x2c, 0x2c, 0x2c, 0x5e, 0x5e, 0x3c,];
pub const GLYPH_MEM: [u8; 8] = [0x54, 0xfe, 0x82, 0xba, 0xba, 0x82, 0xfe, 0x54,];
pub const GLYPH_DISK: [u8; 8] = [0x7e, 0x81, 0x81, 0xff, 0x81, 0x85, 0x81, 0x7e,];
pub const GLYPH_CPU: [u8; 8] = [0x00, 0x03, 0x03, 0x1b, 0x1b, 0xdb, 0xdb, 0x00,];
pub const GLYPH_NET: [u8; 8] = [0x3c, 0x42, 0x99, 0x24, 0x42, 0x18, 0x18, 0x00,];

/// Icons that can prefix a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Temp,
    Mem,
    Disk,
    Cpu,
    Net,
}

impl Icon {
    pub fn bitmap(self) -> &'static [u8; 8] {
        match self {
            Icon::Temp => &GLYPH_TEMP,
            Icon::Mem => &GLYPH_MEM,
            Icon::Disk => &GLYPH_DISK,
            Icon::Cpu => &GLYPH_CPU,
            Icon::Net => &GLYPH_NET,
        }
    }
}
