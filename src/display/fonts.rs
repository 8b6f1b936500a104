/*
 *  display/fonts.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Font registry and text measurement
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

use embedded_graphics::mono_font::iso_8859_13::{
    FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X13, FONT_7X14, FONT_9X15,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::Baseline;
use log::warn;

use crate::constants::DEFAULT_SMALL_FONT;

pub type Font = &'static MonoFont<'static>;

/// Name to font lookup for the built-in mono fonts.
pub struct FontBook;

impl FontBook {
    pub const NAMES: [&'static str; 7] = ["4x6", "5x8", "6x10", "6x13", "7x14", "9x15", "10x20"];

    /// Exact lookup, `None` for unknown names
    pub fn get(name: &str) -> Option<Font> {
        match name.trim().to_ascii_lowercase().as_str() {
            "4x6" => Some(&FONT_4X6),
            "5x8" => Some(&FONT_5X8),
            "6x10" => Some(&FONT_6X10),
            "6x13" => Some(&FONT_6X13),
            "7x14" => Some(&FONT_7X14),
            "9x15" => Some(&FONT_9X15),
            "10x20" => Some(&FONT_10X20),
            _ => None,
        }
    }

    /// Lookup that never fails: unknown names get the default small font
    /// and a warning, layout math still has real glyph metrics to work with.
    pub fn resolve(name: &str) -> Font {
        Self::get(name).unwrap_or_else(|| {
            warn!(
                "Unknown font '{}', substituting {} (known: {})",
                name,
                DEFAULT_SMALL_FONT,
                Self::NAMES.join(", ")
            );
            &FONT_6X10
        })
    }

    pub fn default_font() -> Font {
        &FONT_6X10
    }
}

/// Text Measurement Service: rendered size of `text` in `font`.
pub trait TextMeasure: Send {
    fn measure(&self, text: &str, font: Font) -> Size;

    fn width(&self, text: &str, font: Font) -> u32 {
        self.measure(text, font).width
    }
}

/// Measurement straight from embedded-graphics mono font metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoMeasure;

impl TextMeasure for MonoMeasure {
    fn measure(&self, text: &str, font: Font) -> Size {
        MonoTextStyleBuilder::new()
            .font(font)
            .text_color(BinaryColor::On)
            .build()
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
    }
}
