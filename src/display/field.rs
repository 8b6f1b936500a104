/*
 *  display/field.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Field definition - one positioned line on a page
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

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::constants::ICON_ADVANCE;
use crate::display::components::ScrollParams;
use crate::display::fonts::Font;
use crate::display::template::LineTemplate;
use crate::glyphs::Icon;

/// How a line behaves when its text is wider than the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Drawn once at the field origin, clipped to the field
    Static,
    /// Scrolls infinitely when the text does not fit
    Scroll(ScrollParams),
}

/// Field definition - declarative line positioning
///
/// A field defines a rectangular region on the display and the template
/// whose rendered text is drawn inside it, optionally behind an icon.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field identifier (e.g., "ip", "cpu", "disk")
    pub name: String,

    /// Bounding rectangle (x, y, width, height)
    pub bounds: Rectangle,

    /// Static or scrolling
    pub mode: LineMode,

    /// Font for text rendering
    pub font: Font,

    /// Text with metric substitutions
    pub template: LineTemplate,

    /// 8x8 icon drawn at the left of the field
    pub icon: Option<Icon>,
}

impl Field {
    /// Create a new static text field
    pub fn new_static(
        name: impl Into<String>,
        bounds: Rectangle,
        font: Font,
        template: LineTemplate,
    ) -> Self {
        Self {
            name: name.into(),
            bounds,
            mode: LineMode::Static,
            font,
            template,
            icon: None,
        }
    }

    /// Create a new scrolling text field
    pub fn new_scrolling(
        name: impl Into<String>,
        bounds: Rectangle,
        font: Font,
        template: LineTemplate,
        params: ScrollParams,
    ) -> Self {
        Self {
            name: name.into(),
            bounds,
            mode: LineMode::Scroll(params),
            font,
            template,
            icon: None,
        }
    }

    /// Builder: put an icon in front of the text
    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.mode, LineMode::Scroll(_))
    }

    /// Get field width
    pub fn width(&self) -> u32 {
        self.bounds.size.width
    }

    /// Get field height
    pub fn height(&self) -> u32 {
        self.bounds.size.height
    }

    /// Get top-left position
    pub fn position(&self) -> Point {
        self.bounds.top_left
    }

    /// Region the text is drawn and clipped to, right of any icon
    pub fn text_bounds(&self) -> Rectangle {
        match self.icon {
            Some(_) => {
                let advance = ICON_ADVANCE.min(self.bounds.size.width);
                Rectangle::new(
                    self.bounds.top_left + Point::new(advance as i32, 0),
                    Size::new(self.bounds.size.width - advance, self.bounds.size.height),
                )
            }
            None => self.bounds,
        }
    }

    /// Width available to the text, the scroll viewport
    pub fn viewport_width(&self) -> u32 {
        self.text_bounds().size.width
    }
}
