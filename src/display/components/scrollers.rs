/*
 *  display/components/scrollers.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Seamless infinite horizontal scrolling for text wider than its viewport
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

use arrayvec::ArrayVec;

use crate::constants::{DEFAULT_SCROLL_GAP_PX, DEFAULT_SCROLL_SPEED_PX};

/// Gap between repeated copies and pixels advanced per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollParams {
    pub spacing: u32,
    pub step: u32,
}

impl Default for ScrollParams {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SCROLL_GAP_PX,
            step: DEFAULT_SCROLL_SPEED_PX,
        }
    }
}

/// X positions, relative to the viewport's left edge, at which to draw the text.
/// Never more than two copies are visible.
pub type Placements = ArrayVec<i32, 2>;

/// Result of one scroll step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollStep {
    pub placements: Placements,
    pub next_offset: u64,
}

/// Offset reduced to the current scroll cycle, in `[0, text_width + spacing)`.
#[inline]
pub fn effective_offset(offset: u64, text_width: u32, spacing: u32) -> u32 {
    let total = text_width as u64 + spacing as u64;
    if total == 0 {
        return 0;
    }
    // total fits in u32 + u32, the remainder fits in u32
    (offset % total) as u32
}

/// Decide where to draw a line of `text_width` pixels in a `viewport_width`
/// window this frame, and the offset to carry into the next one.
///
/// Text that fits is drawn once at the left edge and the offset collapses
/// to zero. Wider text is drawn at `-effective_offset`; when the tail of
/// that copy would leave blank space at the right edge, a second copy
/// follows it after `spacing` pixels. The returned offset keeps growing,
/// only the modulo above bounds what is visible.
pub fn advance(text_width: u32, viewport_width: u32, offset: u64, params: ScrollParams) -> ScrollStep {
    let mut placements = Placements::new();

    if text_width <= viewport_width {
        placements.push(0);
        return ScrollStep { placements, next_offset: 0 };
    }

    let eff = effective_offset(offset, text_width, params.spacing) as i64;
    let text_width = text_width as i64;
    placements.push(clamp_x(-eff));

    let tail = text_width - eff;
    if tail < viewport_width as i64 {
        placements.push(clamp_x(tail + params.spacing as i64));
    }

    ScrollStep {
        placements,
        next_offset: offset.wrapping_add(params.step as u64),
    }
}

#[inline]
fn clamp_x(x: i64) -> i32 {
    x.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Scroll position of one line, kept for the life of the process.
#[derive(Debug, Clone)]
pub struct ScrollState {
    text: String,
    text_width: u32,
    viewport_width: u32,
    offset: u64,
    params: ScrollParams,
}

impl ScrollState {
    pub fn new(viewport_width: u32, params: ScrollParams) -> Self {
        Self {
            text: String::new(),
            text_width: 0,
            viewport_width,
            offset: 0,
            params,
        }
    }

    /// Swap in new text. The width is only remeasured when the text
    /// actually changed; the offset carries on either way so a metrics
    /// refresh does not snap the line back to the start.
    /// Returns true if the text changed.
    pub fn update_text<F>(&mut self, text: &str, measure: F) -> bool
    where
        F: FnOnce(&str) -> u32,
    {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.text_width = measure(&self.text);
        true
    }

    /// Placements for this frame without moving the offset
    pub fn peek(&self) -> ScrollStep {
        advance(self.text_width, self.viewport_width, self.offset, self.params)
    }

    /// Placements for this frame, advancing the offset for the next one
    pub fn tick(&mut self) -> Placements {
        let step = self.peek();
        self.offset = step.next_offset;
        step.placements
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_width(&self) -> u32 {
        self.text_width
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn effective_offset(&self) -> u32 {
        effective_offset(self.offset, self.text_width, self.params.spacing)
    }

    pub fn params(&self) -> ScrollParams {
        self.params
    }

    /// True while the text is wider than its viewport
    pub fn is_scrolling(&self) -> bool {
        self.text_width > self.viewport_width
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Back to the left edge
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REFERENCE: ScrollParams = ScrollParams { spacing: 20, step: 2 };

    fn gcd(a: u64, b: u64) -> u64 {
        if b == 0 { a } else { gcd(b, a % b) }
    }

    #[test]
    fn test_fitting_text_is_static() {
        for offset in [0, 1, 57, 10_000] {
            let step = advance(100, 128, offset, REFERENCE);
            assert_eq!(step.placements.as_slice(), &[0]);
            assert_eq!(step.next_offset, 0);
        }
        // exactly the viewport width still fits
        assert_eq!(advance(128, 128, 9, REFERENCE).placements.as_slice(), &[0]);
    }

    #[test]
    fn test_reference_walkthrough() {
        // 128 px viewport, 200 px text, 20 px gap, 2 px per tick
        let first = advance(200, 128, 0, REFERENCE);
        assert_eq!(first.placements.as_slice(), &[0]);
        assert_eq!(first.next_offset, 2);

        let at_100 = advance(200, 128, 100, REFERENCE);
        assert_eq!(at_100.placements.as_slice(), &[-100, 120]);
        assert_eq!(at_100.next_offset, 102);
    }

    #[test]
    fn test_second_copy_threshold() {
        // tail exactly fills the viewport: no second copy yet
        assert_eq!(advance(200, 128, 72, REFERENCE).placements.len(), 1);
        // one pixel further opens a gap that the second copy covers
        assert_eq!(advance(200, 128, 73, REFERENCE).placements.as_slice(), &[-73, 147]);
    }

    #[test]
    fn test_offset_wraps_into_cycle() {
        // cycle length 220: offset 220 looks exactly like offset 0
        assert_eq!(advance(200, 128, 220, REFERENCE).placements, advance(200, 128, 0, REFERENCE).placements);
        // in the gap region the first copy is fully off screen and the second leads
        let gap = advance(200, 128, 210, REFERENCE);
        assert_eq!(gap.placements.as_slice(), &[-210, 10]);
    }

    #[test]
    fn test_zero_spacing_is_back_to_back() {
        let params = ScrollParams { spacing: 0, step: 1 };
        assert_eq!(advance(200, 128, 150, params).placements.as_slice(), &[-150, 50]);
    }

    #[test]
    fn test_state_tick_advances() {
        let mut state = ScrollState::new(128, REFERENCE);
        assert!(state.update_text("wide", |_| 200));
        assert_eq!(state.tick().as_slice(), &[0]);
        assert_eq!(state.offset(), 2);
        for _ in 0..49 {
            state.tick();
        }
        assert_eq!(state.offset(), 100);
        assert_eq!(state.tick().as_slice(), &[-100, 120]);
    }

    #[test]
    fn test_update_text_measures_only_on_change() {
        let mut state = ScrollState::new(128, REFERENCE);
        let mut calls = 0;
        assert!(state.update_text("a", |_| { calls += 1; 150 }));
        assert!(!state.update_text("a", |_| { calls += 1; 150 }));
        assert_eq!(calls, 1);
        state.tick();
        // new text keeps the accumulated offset
        assert!(state.update_text("b", |_| 160));
        assert_eq!(state.offset(), 2);
        assert_eq!(state.text_width(), 160);
    }

    #[test]
    fn test_shrinking_text_restarts_from_left() {
        let mut state = ScrollState::new(128, REFERENCE);
        state.update_text("long", |_| 300);
        for _ in 0..10 {
            state.tick();
        }
        state.update_text("short", |_| 40);
        assert_eq!(state.tick().as_slice(), &[0]);
        assert_eq!(state.offset(), 0);
        state.update_text("long again", |_| 300);
        assert_eq!(state.tick().as_slice(), &[0]);
    }

    #[test]
    fn test_reset() {
        let mut state = ScrollState::new(64, REFERENCE);
        state.update_text("x", |_| 90);
        state.tick();
        state.tick();
        state.reset();
        assert_eq!(state.offset(), 0);
    }

    proptest! {
        #[test]
        fn prop_fits_is_idempotent(
            vw in 1u32..512,
            frac in 0.0f64..=1.0,
            offset in any::<u64>(),
            spacing in 0u32..64,
            step in 1u32..16,
        ) {
            let tw = (vw as f64 * frac) as u32;
            let params = ScrollParams { spacing, step };
            let mut o = offset;
            for _ in 0..4 {
                let s = advance(tw, vw, o, params);
                prop_assert_eq!(s.placements.as_slice(), &[0]);
                prop_assert_eq!(s.next_offset, 0);
                o = s.next_offset;
            }
        }

        #[test]
        fn prop_effective_offset_in_cycle(
            tw in 1u32..2048,
            spacing in 0u32..128,
            offset in any::<u64>(),
        ) {
            let eff = effective_offset(offset, tw, spacing);
            prop_assert!((eff as u64) < tw as u64 + spacing as u64);
        }

        #[test]
        fn prop_scroll_is_seamless(
            vw in 1u32..256,
            extra in 1u32..1024,
            spacing in 0u32..64,
            step in 1u32..16,
            offset in 0u64..1_000_000,
        ) {
            let tw = vw + extra;
            let params = ScrollParams { spacing, step };
            let s = advance(tw, vw, offset, params);
            let eff = effective_offset(offset, tw, spacing) as i64;

            prop_assert_eq!(s.placements[0] as i64, -eff);
            prop_assert_eq!(s.next_offset, offset + step as u64);

            let needs_second = (tw as i64 - eff) < vw as i64;
            prop_assert_eq!(s.placements.len(), if needs_second { 2 } else { 1 });
            if needs_second {
                prop_assert_eq!(s.placements[1] as i64, tw as i64 - eff + spacing as i64);
            }

            // every visible column is text, or inside the one configured gap
            let gap_start = -eff + tw as i64;
            let gap_end = gap_start + spacing as i64;
            for x in 0..vw as i64 {
                let covered = s.placements.iter().any(|&p| x >= p as i64 && x < p as i64 + tw as i64);
                prop_assert!(covered || (x >= gap_start && x < gap_end), "blank column {} at offset {}", x, offset);
            }
            // the right edge is always filled unless it sits in the gap
            let right = vw as i64 - 1;
            let right_covered = s.placements.iter().any(|&p| right >= p as i64 && right < p as i64 + tw as i64);
            prop_assert!(right_covered || (right >= gap_start && right < gap_end));
        }

        #[test]
        fn prop_cycle_repeats(
            vw in 1u32..128,
            extra in 1u32..512,
            spacing in 0u32..64,
            step in 1u32..16,
            start in 0u64..10_000,
        ) {
            let tw = vw + extra;
            let total = tw as u64 + spacing as u64;
            let period = total / gcd(total, step as u64);
            let params = ScrollParams { spacing, step };

            let mut offset = start;
            let first = advance(tw, vw, offset, params).placements;
            for _ in 0..period {
                offset = advance(tw, vw, offset, params).next_offset;
            }
            prop_assert_eq!(offset, start + period * step as u64);
            prop_assert_eq!(advance(tw, vw, offset, params).placements, first);
        }
    }
}
