/*
 *  pacer.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Deadline pacing for the slower scheduler cadences
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

/// Fires at most once per period, measured on the caller's clock.
///
/// The very first check always fires so a freshly started loop has data
/// to show on its first frame.
#[derive(Debug, Clone)]
pub struct Pacer {
    next_deadline: Option<Instant>,
    period: Duration,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self { next_deadline: None, period }
    }

    /// Returns true if the deadline has passed; if true, it also schedules the next deadline.
    #[inline]
    pub fn due_at(&mut self, now: Instant) -> bool {
        match self.next_deadline {
            Some(deadline) if now < deadline => false,
            _ => {
                self.next_deadline = Some(now + self.period);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_check_fires() {
        let mut pacer = Pacer::new(Duration::from_secs(1));
        assert!(pacer.due_at(Instant::now()));
    }

    #[test]
    fn test_fires_once_per_period() {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(Duration::from_secs(1));

        assert!(pacer.due_at(t0));
        assert!(!pacer.due_at(t0 + Duration::from_millis(100)));
        assert!(!pacer.due_at(t0 + Duration::from_millis(999)));
        assert!(pacer.due_at(t0 + Duration::from_secs(1)));
        // rescheduled from the moment it fired
        assert!(!pacer.due_at(t0 + Duration::from_millis(1500)));
        assert!(pacer.due_at(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn test_late_check_reschedules_from_now() {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(Duration::from_secs(1));
        assert!(pacer.due_at(t0));
        assert!(pacer.due_at(t0 + Duration::from_millis(3500)));
        assert!(!pacer.due_at(t0 + Duration::from_millis(4000)));
        assert!(pacer.due_at(t0 + Duration::from_millis(4500)));
    }
}
