/*
 *  display/page_controller.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page rotation controller - decides which page is on screen
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

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// What happens to scroll positions of the page being switched to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSwitchPolicy {
    /// Resume where the page left off
    #[default]
    Persist,
    /// Start every scrolling line from the left edge
    Reset,
}

/// Round-robin page controller.
///
/// The clock starts on the first update. Once `page_duration` has elapsed
/// since the last switch the next page becomes active and the clock
/// restarts. With a single page nothing ever switches.
#[derive(Debug, Clone)]
pub struct PageController {
    page_count: usize,
    current: usize,
    page_duration: Duration,
    last_switch: Option<Instant>,
}

impl PageController {
    pub fn new(page_count: usize, page_duration: Duration) -> Self {
        Self {
            page_count,
            current: 0,
            page_duration,
            last_switch: None,
        }
    }

    /// Index of the page on screen
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn page_duration(&self) -> Duration {
        self.page_duration
    }

    /// Advance the page if its time is up. Returns true if the page changed.
    pub fn update(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_switch else {
            self.last_switch = Some(now);
            return false;
        };
        if self.page_count < 2 || now.saturating_duration_since(last) < self.page_duration {
            return false;
        }

        let previous = self.current;
        self.current = (self.current + 1) % self.page_count;
        self.last_switch = Some(now);
        log::info!("Page changed: {} -> {}", previous, self.current);
        true
    }
}
