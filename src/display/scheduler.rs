/*
 *  display/scheduler.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Render loop: frame ticks, page rotation and metrics refresh
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

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use tokio::time::MissedTickBehavior;

use crate::constants::{DEFAULT_METRICS_INTERVAL_S, DEFAULT_PAGE_DURATION_S, DEFAULT_TICK_INTERVAL_S};
use crate::func_timer::FunctionTimer;
use crate::metrics::{MetricsProvider, MetricsSnapshot, MetricsWorker};
use crate::pacer::Pacer;
use super::compositor::compose_page;
use super::error::DisplayError;
use super::factory::BoxedSink;
use super::fonts::{MonoMeasure, TextMeasure};
use super::framebuffer::FrameBuffer;
use super::page::Page;
use super::page_controller::{PageController, PageSwitchPolicy};

/// Cadences of the three scheduler timers
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    /// Frame cadence
    pub tick_interval: Duration,
    /// Metrics refresh cadence
    pub metrics_interval: Duration,
    /// How long each page stays on screen
    pub page_duration: Duration,
    pub page_switch: PageSwitchPolicy,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs_f64(DEFAULT_TICK_INTERVAL_S),
            metrics_interval: Duration::from_secs_f64(DEFAULT_METRICS_INTERVAL_S),
            page_duration: Duration::from_secs_f64(DEFAULT_PAGE_DURATION_S),
            page_switch: PageSwitchPolicy::default(),
        }
    }
}

/// Where fresh snapshots come from
pub enum MetricsFeed {
    /// Provider called on the render thread when the metrics timer fires
    Inline(Box<dyn MetricsProvider>),
    /// Background worker on its own cadence; the render thread only picks up
    /// finished snapshots
    Worker(MetricsWorker),
}

impl MetricsFeed {
    /// Snapshot to show from this tick on, if there is a new one. The inline
    /// provider runs when the metrics timer fires; a worker snapshot is
    /// picked up on the first tick after it lands.
    fn poll(&mut self, pacer: &mut Pacer, now: Instant) -> Option<Arc<MetricsSnapshot>> {
        match self {
            MetricsFeed::Inline(provider) => pacer.due_at(now).then(|| Arc::new(provider.fetch())),
            MetricsFeed::Worker(worker) => worker.latest(),
        }
    }

    async fn stop(&mut self) {
        if let MetricsFeed::Worker(worker) = self {
            worker.stop().await;
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Page that was drawn
    pub page: usize,
    pub page_switched: bool,
    pub metrics_refreshed: bool,
    /// Frames presented so far, this one included
    pub frame: u64,
}

/// Owns everything the render loop touches: the sink, the measurement
/// service, the pages with their scroll states and the current snapshot.
pub struct DisplayScheduler {
    sink: BoxedSink,
    framebuffer: FrameBuffer,
    measure: Box<dyn TextMeasure>,
    pages: Vec<Page>,
    page_controller: PageController,
    metrics_pacer: Pacer,
    feed: MetricsFeed,
    snapshot: Arc<MetricsSnapshot>,
    options: SchedulerOptions,
    frames: u64,
}

impl DisplayScheduler {
    /// Build a scheduler around an initialised sink.
    ///
    /// Rejects setups the loop cannot render: no pages, an empty page, a
    /// zero sized display or a line with no room for text.
    pub fn new(
        sink: BoxedSink,
        pages: Vec<Page>,
        feed: MetricsFeed,
        options: SchedulerOptions,
    ) -> Result<Self, DisplayError> {
        let (width, height) = sink.dimensions();
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(
                format!("display size {}x{} has no pixels", width, height)
            ));
        }
        if pages.is_empty() {
            return Err(DisplayError::InvalidConfiguration("no pages to show".to_string()));
        }
        if options.tick_interval.is_zero() {
            return Err(DisplayError::InvalidConfiguration("tick interval must be > 0".to_string()));
        }
        for page in &pages {
            if page.is_empty() {
                return Err(DisplayError::InvalidConfiguration(
                    format!("page '{}' has no lines", page.name)
                ));
            }
            if let Some(line) = page.lines().iter().find(|l| l.field.viewport_width() == 0) {
                return Err(DisplayError::InvalidConfiguration(
                    format!("line '{}' on page '{}' has a zero-width viewport", line.field.name, page.name)
                ));
            }
        }

        Ok(Self {
            sink,
            framebuffer: FrameBuffer::new(width, height),
            measure: Box::new(MonoMeasure),
            page_controller: PageController::new(pages.len(), options.page_duration),
            metrics_pacer: Pacer::new(options.metrics_interval),
            pages,
            feed,
            snapshot: Arc::new(MetricsSnapshot::placeholder()),
            options,
            frames: 0,
        })
    }

    /// Swap the text measurement service
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// One render pass at the current time
    pub fn tick(&mut self) -> Result<TickReport, DisplayError> {
        self.tick_at(Instant::now())
    }

    /// One render pass at `now`: page timer, metrics timer, compose, present.
    ///
    /// Only the sink can fail, and a sink failure is returned to the caller.
    pub fn tick_at(&mut self, now: Instant) -> Result<TickReport, DisplayError> {
        let _timer = FunctionTimer::new("DisplayScheduler::tick");

        let page_switched = self.page_controller.update(now);
        let current = self.page_controller.current_page();
        if page_switched {
            if self.options.page_switch == PageSwitchPolicy::Reset {
                self.pages[current].reset_scroll();
            }
            debug!("Showing page '{}'", self.pages[current].name);
        }

        let mut metrics_refreshed = false;
        if let Some(snapshot) = self.feed.poll(&mut self.metrics_pacer, now) {
            debug!("Metrics refreshed ({} values)", snapshot.len());
            self.snapshot = snapshot;
            metrics_refreshed = true;
        }

        self.framebuffer.clear_all();
        compose_page(
            &mut self.pages[current],
            &self.snapshot,
            self.measure.as_ref(),
            &mut self.framebuffer,
        )
        .unwrap_or_else(|never| match never {});

        self.sink.present(&self.framebuffer)?;
        self.frames += 1;

        Ok(TickReport {
            page: current,
            page_switched,
            metrics_refreshed,
            frame: self.frames,
        })
    }

    /// Tick forever at the fixed frame interval. Returns only on a sink failure.
    pub async fn run(&mut self) -> Result<(), DisplayError> {
        let mut ticker = tokio::time::interval(self.options.tick_interval);
        // a slow frame pushes the schedule back rather than bursting to catch up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Display loop started: {} page(s), tick {:?}, metrics {:?}, page {:?}",
            self.pages.len(),
            self.options.tick_interval,
            self.options.metrics_interval,
            self.options.page_duration
        );

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick() {
                error!("Display update failed after {} frames: {}", self.frames, e);
                return Err(e);
            }
        }
    }

    /// Stop any background metrics polling
    pub async fn shutdown(&mut self) {
        self.feed.stop().await;
    }

    /// Best-effort blank of the panel, for shutdown
    pub fn blank(&mut self) -> Result<(), DisplayError> {
        self.sink.blank()
    }

    /// Index of the page on screen
    pub fn active_page(&self) -> usize {
        self.page_controller.current_page()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Scroll offset of a named line on a page
    pub fn scroll_offset(&self, page: usize, line: &str) -> Option<u64> {
        self.pages.get(page)?.scroll_state(line).map(|s| s.offset())
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    /// Last composed frame
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::display::components::ScrollParams;
    use crate::display::drivers::mock::MockDriver;
    use crate::display::field::Field;
    use crate::display::fonts::FontBook;
    use crate::display::template::LineTemplate;
    use crate::metrics::MetricKey;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::Rectangle;
    use embedded_graphics::text::{Baseline, Text};

    const LONG: &str = "a line of text that is far too wide for the panel";

    fn scrolling_page(name: &str) -> Page {
        Page::new(name).add_field(Field::new_scrolling(
            "disk",
            Rectangle::new(Point::zero(), Size::new(128, 10)),
            FontBook::default_font(),
            LineTemplate::parse("{disk}").unwrap(),
            ScrollParams { spacing: 20, step: 2 },
        ))
    }

    fn long_text() -> Box<dyn MetricsProvider> {
        Box::new(|| MetricsSnapshot::default().with(MetricKey::Disk, LONG))
    }

    fn scheduler(pages: Vec<Page>, options: SchedulerOptions) -> (DisplayScheduler, MockDriver) {
        let mock = MockDriver::new_with_size(128, 64);
        let sched = DisplayScheduler::new(
            Box::new(mock.clone()),
            pages,
            MetricsFeed::Inline(long_text()),
            options,
        )
        .unwrap();
        (sched, mock)
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn cpu_page() -> Page {
        Page::new("cpu").add_field(Field::new_static(
            "cpu",
            Rectangle::new(Point::zero(), Size::new(128, 10)),
            FontBook::default_font(),
            LineTemplate::parse("CPU: {cpu}").unwrap(),
        ))
    }

    // what `cpu_page` should look like with `text` on it
    fn text_frame(text: &str) -> FrameBuffer {
        let mut frame = FrameBuffer::new(128, 64);
        Text::with_baseline(
            text,
            Point::zero(),
            MonoTextStyle::new(FontBook::default_font(), BinaryColor::On),
            Baseline::Top,
        )
        .draw(&mut frame)
        .unwrap();
        frame
    }

    #[test]
    fn test_failed_metric_renders_placeholder() {
        let mock = MockDriver::new_with_size(128, 64);
        let provider: Box<dyn MetricsProvider> =
            Box::new(|| MetricsSnapshot::default().with(MetricKey::Cpu, "N/A"));
        let mut sched = DisplayScheduler::new(
            Box::new(mock.clone()),
            vec![cpu_page()],
            MetricsFeed::Inline(provider),
            SchedulerOptions::default(),
        )
        .unwrap();

        sched.tick_at(Instant::now()).unwrap();

        assert_eq!(mock.last_frame(), Some(text_frame("CPU: N/A")));
    }

    #[tokio::test]
    async fn test_worker_feed_shows_snapshot_as_soon_as_it_lands() {
        // the first collection is held until the gate opens
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let provider: Box<dyn MetricsProvider> = Box::new(move || {
            let _ = gate_rx.recv();
            MetricsSnapshot::default().with(MetricKey::Cpu, "0.52")
        });
        let mock = MockDriver::new_with_size(128, 64);
        let mut sched = DisplayScheduler::new(
            Box::new(mock.clone()),
            vec![cpu_page()],
            MetricsFeed::Worker(MetricsWorker::spawn(provider, Duration::from_millis(10))),
            SchedulerOptions::default(),
        )
        .unwrap();

        // frames keep coming while the worker is stuck
        for _ in 0..3 {
            assert!(!sched.tick().unwrap().metrics_refreshed);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(mock.present_count(), 3);
        assert_eq!(mock.last_frame(), Some(text_frame("CPU: N/A")));

        gate_tx.send(()).unwrap();
        // well inside the 1 s metrics interval
        let mut refreshed = false;
        for _ in 0..60 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if sched.tick().unwrap().metrics_refreshed {
                refreshed = true;
                break;
            }
        }
        assert!(refreshed, "worker snapshot was not picked up");
        assert_eq!(sched.snapshot().display(MetricKey::Cpu), "0.52");
        assert_eq!(mock.last_frame(), Some(text_frame("CPU: 0.52")));

        // let the blocked collection return so the worker can stop
        drop(gate_tx);
        sched.shutdown().await;
    }

    #[test]
    fn test_page_switches_after_duration() {
        let (mut sched, _mock) = scheduler(
            vec![scrolling_page("a"), scrolling_page("b")],
            SchedulerOptions::default(),
        );
        let t0 = Instant::now();

        assert_eq!(sched.tick_at(t0).unwrap().page, 0);
        assert_eq!(sched.tick_at(t0 + secs(29.9)).unwrap().page, 0);
        let report = sched.tick_at(t0 + secs(30.0)).unwrap();
        assert!(report.page_switched);
        assert_eq!(report.page, 1);
        assert_eq!(sched.tick_at(t0 + secs(60.0)).unwrap().page, 0);
    }

    #[test]
    fn test_inactive_page_scroll_is_untouched() {
        let (mut sched, _mock) = scheduler(
            vec![scrolling_page("a"), scrolling_page("b")],
            SchedulerOptions::default(),
        );
        let t0 = Instant::now();
        let tick = secs(0.1);

        // five frames on page a
        for i in 0..5 {
            sched.tick_at(t0 + tick * i).unwrap();
        }
        assert_eq!(sched.scroll_offset(0, "disk"), Some(10));
        assert_eq!(sched.scroll_offset(1, "disk"), Some(0));

        // page b for a while
        for i in 0..20 {
            sched.tick_at(t0 + secs(30.0) + tick * i).unwrap();
        }
        assert_eq!(sched.active_page(), 1);
        assert_eq!(sched.scroll_offset(0, "disk"), Some(10));
        assert_eq!(sched.scroll_offset(1, "disk"), Some(40));

        // back on page a the scroll continues where it stopped
        sched.tick_at(t0 + secs(60.0)).unwrap();
        assert_eq!(sched.active_page(), 0);
        assert_eq!(sched.scroll_offset(0, "disk"), Some(12));
        assert_eq!(sched.scroll_offset(1, "disk"), Some(40));
    }

    #[test]
    fn test_reset_policy_restarts_entered_page() {
        let options = SchedulerOptions {
            page_switch: PageSwitchPolicy::Reset,
            ..Default::default()
        };
        let (mut sched, _mock) = scheduler(vec![scrolling_page("a"), scrolling_page("b")], options);
        let t0 = Instant::now();

        for i in 0..5 {
            sched.tick_at(t0 + secs(0.1) * i).unwrap();
        }
        sched.tick_at(t0 + secs(30.0)).unwrap();
        sched.tick_at(t0 + secs(60.0)).unwrap();
        assert_eq!(sched.active_page(), 0);
        // reset on entry, then one frame drawn
        assert_eq!(sched.scroll_offset(0, "disk"), Some(2));
    }

    #[test]
    fn test_metrics_refresh_cadence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let provider: Box<dyn MetricsProvider> = Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            MetricsSnapshot::default()
        });
        let mut sched = DisplayScheduler::new(
            Box::new(MockDriver::new_with_size(128, 64)),
            vec![scrolling_page("a")],
            MetricsFeed::Inline(provider),
            SchedulerOptions::default(),
        )
        .unwrap();

        let t0 = Instant::now();
        assert!(sched.tick_at(t0).unwrap().metrics_refreshed);
        for i in 1..10 {
            assert!(!sched.tick_at(t0 + secs(0.1) * i).unwrap().metrics_refreshed);
        }
        assert!(sched.tick_at(t0 + secs(1.0)).unwrap().metrics_refreshed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_single_page_never_switches() {
        let (mut sched, mock) = scheduler(vec![scrolling_page("only")], SchedulerOptions::default());
        let t0 = Instant::now();
        for s in 0..10 {
            let report = sched.tick_at(t0 + secs(31.0) * s).unwrap();
            assert!(!report.page_switched);
            assert_eq!(report.page, 0);
        }
        assert_eq!(mock.present_count(), 10);
    }

    #[test]
    fn test_sink_failure_is_propagated() {
        let (mut sched, mock) = scheduler(vec![scrolling_page("a")], SchedulerOptions::default());
        sched.tick().unwrap();
        mock.state().lock().unwrap().simulate_present_failure = true;
        assert!(sched.tick().is_err());
        assert_eq!(sched.frames(), 1);
    }

    #[test]
    fn test_rejects_unrenderable_setups() {
        let feed = || MetricsFeed::Inline(long_text());
        let sink = || -> BoxedSink { Box::new(MockDriver::new_with_size(128, 64)) };

        assert!(DisplayScheduler::new(sink(), vec![], feed(), SchedulerOptions::default()).is_err());
        assert!(DisplayScheduler::new(sink(), vec![Page::new("empty")], feed(), SchedulerOptions::default()).is_err());

        let narrow = Page::new("narrow").add_field(Field::new_scrolling(
            "x",
            Rectangle::new(Point::zero(), Size::new(0, 10)),
            FontBook::default_font(),
            LineTemplate::parse("{ip}").unwrap(),
            ScrollParams::default(),
        ));
        assert!(DisplayScheduler::new(sink(), vec![narrow], feed(), SchedulerOptions::default()).is_err());

        let zero = Box::new(MockDriver::new_with_size(0, 64));
        assert!(DisplayScheduler::new(zero, vec![scrolling_page("a")], feed(), SchedulerOptions::default()).is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_sink_failure() {
        let options = SchedulerOptions {
            tick_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let (mut sched, mock) = scheduler(vec![scrolling_page("a")], options);
        mock.state().lock().unwrap().simulate_present_failure = true;
        assert!(sched.run().await.is_err());
        assert_eq!(sched.frames(), 0);
    }
}
