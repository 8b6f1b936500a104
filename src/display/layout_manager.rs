/*
 *  display/layout_manager.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layout manager - builds the built-in and configured pages
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

use std::collections::HashSet;

use clap::ValueEnum;
use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError, LineConfig, PageConfig};
use crate::constants::{
    DEFAULT_MAIN_FONT, DEFAULT_SMALL_FONT, ICON_ROW_PITCH, STATS_LINE_PITCH,
};
use crate::glyphs::Icon;
use super::components::ScrollParams;
use super::field::Field;
use super::fonts::{Font, FontBook};
use super::page::Page;
use super::template::LineTemplate;

/// Pages that ship with the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinLayout {
    /// IP on top, CPU/temp, memory and disk scrolling below
    Stats,
    /// Two-column icon grid
    Icons,
}

fn template(source: &str) -> Result<LineTemplate, ConfigError> {
    LineTemplate::parse(source).map_err(|source_err| ConfigError::Template {
        template: source.to_string(),
        source: source_err,
    })
}

/// Layout manager - creates and owns all page definitions
pub struct LayoutManager {
    width: u32,
    height: u32,
    scroll: ScrollParams,
    main_font: Font,
    small_font: Font,
}

impl LayoutManager {
    /// Create a new layout manager for a display of the given size
    pub fn new(width: u32, height: u32, scroll: ScrollParams) -> Self {
        Self {
            width,
            height,
            scroll,
            main_font: FontBook::resolve(DEFAULT_MAIN_FONT),
            small_font: FontBook::resolve(DEFAULT_SMALL_FONT),
        }
    }

    /// Builder: font for the stats page and for configured lines without one
    pub fn with_main_font(mut self, font: Font) -> Self {
        self.main_font = font;
        self
    }

    /// Layout manager matching the effective configuration
    pub fn from_config(cfg: &Config) -> Self {
        let (width, height) = cfg.display.clone().unwrap_or_default().frame_size();
        let manager = Self::new(width, height, cfg.scheduler().scroll_params());
        match cfg.font.as_deref() {
            Some(name) => manager.with_main_font(FontBook::resolve(name)),
            None => manager,
        }
    }

    /// Create the scrolling stats page
    ///
    /// One static line for the address, then CPU/temperature, memory and
    /// disk lines that scroll when wider than the display. Rows that would
    /// start below the panel are left out.
    pub fn create_stats_page(&self) -> Result<Page, ConfigError> {
        let rows: [(&str, &str, bool); 4] = [
            ("ip", "IP: {ip}", false),
            ("cpu", "CPU: {cpu} | Temp: {temp}", true),
            ("mem", "Mem: {mem}", true),
            ("disk", "Disk: {disk}", true),
        ];

        let mut page = Page::new("stats");
        for (i, (name, text, scrolls)) in rows.into_iter().enumerate() {
            let y = i as i32 * STATS_LINE_PITCH;
            if y >= self.height as i32 {
                break;
            }
            let bounds = Rectangle::new(Point::new(0, y), Size::new(self.width, STATS_LINE_PITCH as u32));
            let field = if scrolls {
                Field::new_scrolling(name, bounds, self.main_font, template(text)?, self.scroll)
            } else {
                Field::new_static(name, bounds, self.main_font, template(text)?)
            };
            page = page.add_field(field);
        }
        Ok(page)
    }

    /// Create the icon grid page
    ///
    /// Temperature and memory on the first row, disk and CPU on the
    /// second, network address across the third. Every cell is its own
    /// viewport; values that overflow a cell scroll inside it.
    pub fn create_icon_page(&self) -> Result<Page, ConfigError> {
        let half = self.width / 2;
        let cells: [(&str, Icon, &str, i32, u32, u32, bool); 5] = [
            ("temp", Icon::Temp, "{temp}", 0, 0, half, true),
            ("mem", Icon::Mem, "{mem}", 0, half, self.width - half, true),
            ("disk", Icon::Disk, "{disk}", 1, 0, half, true),
            ("cpu", Icon::Cpu, "{cpu}", 1, half, self.width - half, true),
            ("net", Icon::Net, "{ip}", 2, 0, self.width, false),
        ];

        let mut page = Page::new("icons");
        for (name, icon, text, row, x, width, scrolls) in cells {
            let y = row * ICON_ROW_PITCH;
            if y >= self.height as i32 {
                continue;
            }
            let bounds = Rectangle::new(
                Point::new(x as i32, y),
                Size::new(width, ICON_ROW_PITCH as u32),
            );
            let field = if scrolls {
                Field::new_scrolling(name, bounds, self.small_font, template(text)?, self.scroll)
            } else {
                Field::new_static(name, bounds, self.small_font, template(text)?)
            };
            page = page.add_field(field.with_icon(icon));
        }
        Ok(page)
    }

    pub fn create_builtin(&self, layout: BuiltinLayout) -> Result<Page, ConfigError> {
        match layout {
            BuiltinLayout::Stats => self.create_stats_page(),
            BuiltinLayout::Icons => self.create_icon_page(),
        }
    }

    /// Build pages from YAML page definitions.
    ///
    /// Omitted geometry defaults to a full-width row at the line's `y`,
    /// as tall as its font. Every line must lie inside the display and
    /// leave some width for text.
    pub fn pages_from_config(&self, pages: &[PageConfig]) -> Result<Vec<Page>, ConfigError> {
        let mut names = HashSet::new();
        let mut built = Vec::with_capacity(pages.len());

        for page_cfg in pages {
            if !names.insert(page_cfg.name.as_str()) {
                return Err(ConfigError::Validation(format!("duplicate page name '{}'", page_cfg.name)));
            }
            if page_cfg.lines.is_empty() {
                return Err(ConfigError::Validation(format!("page '{}' has no lines", page_cfg.name)));
            }

            let mut page = Page::new(page_cfg.name.clone());
            let mut line_names = HashSet::new();
            for (i, line) in page_cfg.lines.iter().enumerate() {
                let field = self.field_from_config(&page_cfg.name, i, line)?;
                if !line_names.insert(field.name.clone()) {
                    return Err(ConfigError::Validation(format!(
                        "page '{}': duplicate line name '{}'",
                        page_cfg.name, field.name
                    )));
                }
                page = page.add_field(field);
            }
            built.push(page);
        }
        Ok(built)
    }

    fn field_from_config(&self, page: &str, index: usize, line: &LineConfig) -> Result<Field, ConfigError> {
        let name = line.name.clone().unwrap_or_else(|| format!("line{}", index));
        let font = line.font.as_deref().map(FontBook::resolve).unwrap_or(self.main_font);
        let x = line.x.unwrap_or(0);
        let y = line.y;
        let width = line
            .width
            .unwrap_or_else(|| self.width.saturating_sub(x.max(0) as u32));
        let height = line.height.unwrap_or(font.character_size.height);

        let invalid = |why: String| ConfigError::Validation(format!("page '{}', line '{}': {}", page, name, why));

        if x < 0 || y < 0 {
            return Err(invalid(format!("position ({}, {}) is off the display", x, y)));
        }
        if width == 0 || height == 0 {
            return Err(invalid("width and height must be > 0".to_string()));
        }
        if x as u64 + width as u64 > self.width as u64 || y as u64 + height as u64 > self.height as u64 {
            return Err(invalid(format!(
                "{}x{} at ({}, {}) does not fit a {}x{} display",
                width, height, x, y, self.width, self.height
            )));
        }

        let bounds = Rectangle::new(Point::new(x, y), Size::new(width, height));
        let text = template(&line.text)?;
        let mut field = if line.scroll.unwrap_or(true) {
            let params = ScrollParams {
                spacing: line.spacing.unwrap_or(self.scroll.spacing),
                step: line.step.unwrap_or(self.scroll.step),
            };
            if params.step == 0 {
                return Err(invalid("step must be > 0".to_string()));
            }
            Field::new_scrolling(name.clone(), bounds, font, text, params)
        } else {
            Field::new_static(name.clone(), bounds, font, text)
        };
        if let Some(icon) = line.icon {
            field = field.with_icon(icon);
        }
        if field.viewport_width() == 0 {
            return Err(invalid("no room left for text after the icon".to_string()));
        }
        Ok(field)
    }

    /// The pages to show: configured pages when present, otherwise the
    /// selected built-ins (both by default).
    pub fn pages_for(&self, cfg: &Config) -> Result<Vec<Page>, ConfigError> {
        if let Some(pages) = cfg.pages.as_ref().filter(|p| !p.is_empty()) {
            return self.pages_from_config(pages);
        }
        let layouts = cfg
            .layout
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| vec![BuiltinLayout::Stats, BuiltinLayout::Icons]);
        layouts.into_iter().map(|l| self.create_builtin(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

    fn manager() -> LayoutManager {
        LayoutManager::new(DISPLAY_WIDTH, DISPLAY_HEIGHT, ScrollParams::default())
    }

    fn line(text: &str, y: i32) -> LineConfig {
        LineConfig {
            text: text.to_string(),
            y,
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_page_geometry() {
        let page = manager().create_stats_page().unwrap();
        let names: Vec<&str> = page.lines().iter().map(|l| l.field.name.as_str()).collect();
        assert_eq!(names, vec!["ip", "cpu", "mem", "disk"]);

        let ys: Vec<i32> = page.lines().iter().map(|l| l.field.position().y).collect();
        assert_eq!(ys, vec![0, 16, 32, 48]);

        assert!(page.scroll_state("ip").is_none());
        assert_eq!(page.scroll_state("disk").map(|s| s.viewport_width()), Some(128));
        assert_eq!(page.get_field("cpu").map(|f| f.template.source()), Some("CPU: {cpu} | Temp: {temp}"));
    }

    #[test]
    fn test_stats_page_on_short_display() {
        let page = LayoutManager::new(128, 32, ScrollParams::default()).create_stats_page().unwrap();
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_quarter_turn_lays_out_portrait() {
        let cfg = Config {
            display: Some(crate::config::DisplayConfig {
                rotate_deg: Some(90),
                ..Default::default()
            }),
            ..Default::default()
        };
        let pages = LayoutManager::from_config(&cfg).pages_for(&cfg).unwrap();
        assert_eq!(pages[0].len(), 4);
        assert_eq!(pages[0].scroll_state("disk").map(|s| s.viewport_width()), Some(64));
        assert_eq!(pages[1].get_field("cpu").map(|f| f.position()), Some(Point::new(32, 18)));
    }

    #[test]
    fn test_icon_page_cells() {
        let page = manager().create_icon_page().unwrap();
        assert_eq!(page.len(), 5);
        let disk = page.get_field("disk").unwrap();
        assert_eq!(disk.position(), Point::new(0, 18));
        assert_eq!(disk.icon, Some(Icon::Disk));
        assert_eq!(page.scroll_state("disk").map(|s| s.viewport_width()), Some(54));
        assert_eq!(page.get_field("cpu").map(|f| f.position()), Some(Point::new(64, 18)));
        assert!(page.scroll_state("net").is_none());
    }

    #[test]
    fn test_default_pages_are_both_builtins() {
        let pages = manager().pages_for(&Config::default()).unwrap();
        let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["stats", "icons"]);
    }

    #[test]
    fn test_single_builtin_layout() {
        let cfg = Config {
            layout: Some(vec![BuiltinLayout::Stats]),
            ..Default::default()
        };
        assert_eq!(manager().pages_for(&cfg).unwrap().len(), 1);
    }

    #[test]
    fn test_configured_page_defaults() {
        let pages = manager()
            .pages_from_config(&[PageConfig {
                name: "custom".to_string(),
                lines: vec![line("Up {uptime}", 0), line("{time}", 20)],
            }])
            .unwrap();
        let page = &pages[0];
        let first = &page.lines()[0].field;
        assert_eq!(first.name, "line0");
        assert_eq!(first.bounds, Rectangle::new(Point::zero(), Size::new(128, 14)));
        assert!(first.is_scrolling());
    }

    #[test]
    fn test_configured_page_errors() {
        let m = manager();
        let page = |lines: Vec<LineConfig>| PageConfig { name: "p".to_string(), lines };

        assert!(m.pages_from_config(&[page(vec![])]).is_err());
        assert!(matches!(
            m.pages_from_config(&[page(vec![line("{nope}", 0)])]),
            Err(ConfigError::Template { .. })
        ));
        // below the panel
        assert!(m.pages_from_config(&[page(vec![line("x", 60)])]).is_err());
        // wider than the panel
        let wide = LineConfig { x: Some(100), width: Some(40), ..line("x", 0) };
        assert!(m.pages_from_config(&[page(vec![wide])]).is_err());
        // icon eats the whole viewport
        let cramped = LineConfig { width: Some(10), icon: Some(Icon::Cpu), ..line("x", 0) };
        assert!(m.pages_from_config(&[page(vec![cramped])]).is_err());
        // duplicate page names
        let ok = page(vec![line("x", 0)]);
        assert!(m.pages_from_config(&[ok.clone(), ok]).is_err());
    }
}
