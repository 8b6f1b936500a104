/*
 *  display/page.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page layout - an ordered set of lines shown together
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

use super::components::ScrollState;
use super::field::{Field, LineMode};

/// One line of a page and, for scrolling lines, its scroll position.
#[derive(Debug, Clone)]
pub struct PageLine {
    pub field: Field,
    pub scroll: Option<ScrollState>,
}

impl PageLine {
    pub fn new(field: Field) -> Self {
        let scroll = match field.mode {
            LineMode::Scroll(params) => Some(ScrollState::new(field.viewport_width(), params)),
            LineMode::Static => None,
        };
        Self { field, scroll }
    }
}

/// Page layout - collection of lines defining one screen
///
/// Scroll states live with the page, so a page that is switched away from
/// keeps its positions until it is shown again.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page identifier
    pub name: String,

    lines: Vec<PageLine>,
}

impl Page {
    /// Create a new empty page
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Add a field to the page
    pub fn add_field(mut self, field: Field) -> Self {
        self.lines.push(PageLine::new(field));
        self
    }

    /// Add multiple fields to the page
    pub fn add_fields(mut self, fields: Vec<Field>) -> Self {
        self.lines.extend(fields.into_iter().map(PageLine::new));
        self
    }

    pub fn lines(&self) -> &[PageLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [PageLine] {
        &mut self.lines
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.lines.iter().map(|l| &l.field).find(|f| f.name == name)
    }

    /// Scroll state of a named line, `None` for static or unknown lines
    pub fn scroll_state(&self, name: &str) -> Option<&ScrollState> {
        self.lines
            .iter()
            .find(|l| l.field.name == name)
            .and_then(|l| l.scroll.as_ref())
    }

    pub fn scroll_state_mut(&mut self, name: &str) -> Option<&mut ScrollState> {
        self.lines
            .iter_mut()
            .find(|l| l.field.name == name)
            .and_then(|l| l.scroll.as_mut())
    }

    /// Every scrolling line back to the left edge
    pub fn reset_scroll(&mut self) {
        for state in self.lines.iter_mut().filter_map(|l| l.scroll.as_mut()) {
            state.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::components::ScrollParams;
    use crate::display::fonts::FontBook;
    use crate::display::template::LineTemplate;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::Rectangle;

    fn page() -> Page {
        let font = FontBook::default_font();
        Page::new("stats")
            .add_field(Field::new_static(
                "ip",
                Rectangle::new(Point::zero(), Size::new(128, 16)),
                font,
                LineTemplate::parse("IP: {ip}").unwrap(),
            ))
            .add_field(Field::new_scrolling(
                "mem",
                Rectangle::new(Point::new(0, 16), Size::new(128, 16)),
                font,
                LineTemplate::parse("Mem: {mem}").unwrap(),
                ScrollParams::default(),
            ))
    }

    #[test]
    fn test_only_scrolling_lines_get_state() {
        let p = page();
        assert_eq!(p.len(), 2);
        assert!(p.scroll_state("ip").is_none());
        assert_eq!(p.scroll_state("mem").map(|s| s.viewport_width()), Some(128));
        assert!(p.get_field("nope").is_none());
    }

    #[test]
    fn test_reset_scroll() {
        let mut p = page();
        if let Some(s) = p.scroll_state_mut("mem") {
            s.set_offset(42);
        }
        p.reset_scroll();
        assert_eq!(p.scroll_state("mem").map(|s| s.offset()), Some(0));
    }
}
