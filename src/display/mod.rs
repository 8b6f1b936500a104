/*
 *  display/mod.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - pages, scrolling lines and frame sinks
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod factory;

// Display drivers (hardware ones per cargo feature)
pub mod drivers;

// Text handling
pub mod fonts;
pub mod template;

// UI components
pub mod components;

// Field-based layout system
pub mod field;
pub mod page;
pub mod layout_manager;

// Rendering and scheduling
pub mod compositor;
pub mod page_controller;
pub mod scheduler;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, FrameSink};
pub use error::{DisplayError, DisplayFactoryError};
pub use framebuffer::FrameBuffer;
pub use factory::{BoxedSink, DisplayDriverFactory};
pub use fonts::{Font, FontBook, MonoMeasure, TextMeasure};
pub use template::{LineTemplate, TemplateError};
pub use field::{Field, LineMode};
pub use page::{Page, PageLine};
pub use layout_manager::{BuiltinLayout, LayoutManager};
pub use compositor::compose_page;
pub use page_controller::{PageController, PageSwitchPolicy};
pub use scheduler::{DisplayScheduler, MetricsFeed, SchedulerOptions, TickReport};
pub use drivers::mock::MockDriver;

#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::Ssd1306Driver;
