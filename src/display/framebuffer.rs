/*
 *  display/framebuffer.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime sized monochrome framebuffer the scheduler composes into
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

use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized monochrome framebuffer for embedded-graphics.
///
/// Drawing outside the buffer is silently clipped, so scrolled text may
/// be placed at negative or off-screen positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    buf: Vec<BinaryColor>,
    w: usize,
    h: usize,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![BinaryColor::Off; w * h], w, h }
    }

    pub fn width(&self) -> u32 { self.w as u32 }
    pub fn height(&self) -> u32 { self.h as u32 }

    /// Get dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.w as u32, self.h as u32)
    }

    /// Turn every pixel off
    pub fn clear_all(&mut self) {
        self.buf.fill(BinaryColor::Off);
    }

    /// Immutable raw access, row major
    pub fn as_slice(&self) -> &[BinaryColor] { &self.buf }

    /// Pixel at (x, y); out of range reads as off
    pub fn pixel(&self, x: i32, y: i32) -> BinaryColor {
        self.idx(Point::new(x, y))
            .map(|i| self.buf[i])
            .unwrap_or(BinaryColor::Off)
    }

    /// Number of lit pixels, handy for asserting something was drawn
    pub fn count_on(&self) -> usize {
        self.buf.iter().filter(|c| c.is_on()).count()
    }

    /// Lit pixel count inside a rectangle
    pub fn count_on_in(&self, area: &Rectangle) -> usize {
        area.points().filter(|p| self.pixel(p.x, p.y).is_on()).count()
    }

    /// Every pixel with its coordinates, ready for `DrawTarget::draw_iter`
    pub fn pixels(&self) -> impl Iterator<Item = Pixel<BinaryColor>> + '_ {
        let w = self.w;
        self.buf
            .iter()
            .enumerate()
            .map(move |(i, &c)| Pixel(Point::new((i % w) as i32, (i / w) as i32), c))
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // colors arrive row by row over the whole area, clip per pixel
        let mut it = colors.into_iter();
        for p in area.points() {
            let Some(c) = it.next() else { return Ok(()) };
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn test_new_buffer_is_blank() {
        let fb = FrameBuffer::new(128, 64);
        assert_eq!(fb.dimensions(), (128, 64));
        assert_eq!(fb.as_slice().len(), 128 * 64);
        assert_eq!(fb.count_on(), 0);
    }

    #[test]
    fn test_offscreen_pixels_are_clipped() {
        let mut fb = FrameBuffer::new(8, 8);
        Rectangle::new(Point::new(-4, -4), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        // only the 4x4 top-left quadrant lands on screen
        assert_eq!(fb.count_on(), 16);
        assert!(fb.pixel(3, 3).is_on());
        assert!(fb.pixel(4, 4).is_off());
    }

    #[test]
    fn test_clear_all() {
        let mut fb = FrameBuffer::new(16, 16);
        fb.clear(BinaryColor::On).unwrap();
        assert_eq!(fb.count_on(), 256);
        fb.clear_all();
        assert_eq!(fb.count_on(), 0);
    }

    #[test]
    fn test_pixels_iterator_coordinates() {
        let mut fb = FrameBuffer::new(4, 3);
        Pixel(Point::new(2, 1), BinaryColor::On).draw(&mut fb).unwrap();
        let lit: Vec<Point> = fb.pixels().filter(|p| p.1.is_on()).map(|p| p.0).collect();
        assert_eq!(lit, vec![Point::new(2, 1)]);
    }
}
