/*
 *  display/compositor.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Draws one page of fixed and scrolling lines into a frame
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

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::glyphs::{Icon, GLYPH_WIDTH};
use crate::metrics::MetricsSnapshot;
use super::fonts::TextMeasure;
use super::page::{Page, PageLine};

/// Draw every line of `page` into `target`.
///
/// Static lines are drawn once at the field origin. Scrolling lines pick
/// up the snapshot text, then advance their scroll state by one tick and
/// draw a copy at each placement. Text is clipped to its field so a wide
/// line never bleeds into its neighbours. The target is not cleared here.
pub fn compose_page<D>(
    page: &mut Page,
    snapshot: &MetricsSnapshot,
    measure: &dyn TextMeasure,
    target: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut text = String::new();
    for line in page.lines_mut() {
        line.field.template.render_into(snapshot, &mut text);
        compose_line(line, &text, measure, target)?;
    }
    Ok(())
}

fn compose_line<D>(
    line: &mut PageLine,
    text: &str,
    measure: &dyn TextMeasure,
    target: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let field = &line.field;

    if let Some(icon) = field.icon {
        draw_icon(icon, field.position(), target)?;
    }

    let bounds = field.text_bounds();
    if bounds.size.width == 0 || bounds.size.height == 0 {
        return Ok(());
    }
    let style = MonoTextStyle::new(field.font, BinaryColor::On);
    let origin = bounds.top_left;
    let mut clipped = target.clipped(&bounds);

    match line.scroll.as_mut() {
        None => {
            Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut clipped)?;
        }
        Some(state) => {
            let font = field.font;
            state.update_text(text, |t| measure.width(t, font));
            for x in state.tick() {
                let at = origin + Point::new(x, 0);
                Text::with_baseline(state.text(), at, style, Baseline::Top).draw(&mut clipped)?;
            }
        }
    }
    Ok(())
}

fn draw_icon<D>(icon: Icon, at: Point, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let raw: ImageRaw<BinaryColor> = ImageRaw::new(icon.bitmap(), GLYPH_WIDTH);
    Image::new(&raw, at).draw(target)?;
    Ok(())
}
