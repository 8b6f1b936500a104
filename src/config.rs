use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::{
    DEFAULT_I2C_ADDRESS, DEFAULT_I2C_BUS, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};
use crate::display::components::ScrollParams;
use crate::display::layout_manager::{BuiltinLayout, LayoutManager};
use crate::display::page_controller::PageSwitchPolicy;
use crate::display::scheduler::SchedulerOptions;
use crate::display::template::TemplateError;
use crate::display::traits::rotated_size;
use crate::glyphs::Icon;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Template error in '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: TemplateError,
    },
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// font for the stats page, see FontBook::NAMES
    pub font: Option<String>,
    /// display-specific geometry & behavior
    pub display: Option<DisplayConfig>,
    /// timers, scrolling and page rotation
    pub scheduler: Option<SchedulerConfig>,
    /// built-in pages to show, in order
    pub layout: Option<Vec<BuiltinLayout>>,
    /// custom pages, replace the built-ins when present
    pub pages: Option<Vec<PageConfig>>,
}

impl Config {
    pub fn scheduler(&self) -> SchedulerConfig {
        self.scheduler.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub invert: Option<bool>,
    pub brightness: Option<u8>,     // 0-255
    pub driver: Option<DriverKind>, // <- strongly-typed driver selection
    pub bus: Option<BusConfig>,     // <- i2c wiring
}

impl DisplayConfig {
    pub fn width_or_default(&self) -> u32 {
        self.width.unwrap_or(DISPLAY_WIDTH)
    }

    pub fn height_or_default(&self) -> u32 {
        self.height.unwrap_or(DISPLAY_HEIGHT)
    }

    /// Drawable (width, height) once `rotate_deg` is applied
    pub fn frame_size(&self) -> (u32, u32) {
        rotated_size(
            self.width_or_default(),
            self.height_or_default(),
            self.rotate_deg.unwrap_or(0),
        )
    }

    /// Configured bus, or the Pi desktop case panel
    pub fn bus_or_default(&self) -> BusConfig {
        self.bus.clone().unwrap_or_else(|| BusConfig::I2c {
            bus: DEFAULT_I2C_BUS.to_string(),
            address: DEFAULT_I2C_ADDRESS,
            speed_hz: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x3C (I2C addresses are 7-bit, stored in u8)
        speed_hz: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Ssd1306,
    /// Render into memory only, no panel attached
    Headless,
}

/// Scheduler timers and scroll tuning, seconds and pixels.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchedulerConfig {
    pub tick_interval_s: Option<f64>,
    pub metrics_interval_s: Option<f64>,
    pub page_duration_s: Option<f64>,
    pub scroll_speed_px: Option<u32>,
    pub scroll_gap_px: Option<u32>,
    pub page_switch: Option<PageSwitchPolicy>,
    /// collect metrics on a background task instead of the render loop
    pub metrics_worker: Option<bool>,
}

impl SchedulerConfig {
    /// Scheduler options with unset fields at their defaults.
    /// Call after `validate`, non-positive intervals are rejected there.
    pub fn options(&self) -> SchedulerOptions {
        let defaults = SchedulerOptions::default();
        let secs = |v: Option<f64>, d: Duration| {
            v.and_then(|s| Duration::try_from_secs_f64(s).ok()).unwrap_or(d)
        };
        SchedulerOptions {
            tick_interval: secs(self.tick_interval_s, defaults.tick_interval),
            metrics_interval: secs(self.metrics_interval_s, defaults.metrics_interval),
            page_duration: secs(self.page_duration_s, defaults.page_duration),
            page_switch: self.page_switch.unwrap_or(defaults.page_switch),
        }
    }

    pub fn scroll_params(&self) -> ScrollParams {
        let defaults = ScrollParams::default();
        ScrollParams {
            spacing: self.scroll_gap_px.unwrap_or(defaults.spacing),
            step: self.scroll_speed_px.unwrap_or(defaults.step),
        }
    }

    pub fn metrics_worker(&self) -> bool {
        self.metrics_worker.unwrap_or(false)
    }
}

/// A custom page: named lines drawn together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub name: String,
    pub lines: Vec<LineConfig>,
}

/// One line of a custom page. Geometry left out defaults to a full-width
/// row as tall as the font.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LineConfig {
    pub name: Option<String>,
    /// template, e.g. "Mem: {mem}"
    pub text: String,
    pub x: Option<i32>,
    #[serde(default)]
    pub y: i32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font: Option<String>,
    /// scroll when wider than the line (default true)
    pub scroll: Option<bool>,
    pub spacing: Option<u32>,
    pub step: Option<u32>,
    pub icon: Option<Icon>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "lystats", version, about = "LyStats - host metrics on a small OLED", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub font: Option<String>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    /// I2C device, e.g. /dev/i2c-1
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub i2c_bus: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    #[arg(long, action = ArgAction::Set)]
    pub display_invert: Option<bool>,
    #[arg(long)]
    pub display_brightness: Option<u8>,
    #[arg(long)]
    pub tick_interval_s: Option<f64>,
    #[arg(long)]
    pub page_duration_s: Option<f64>,
    #[arg(long)]
    pub scroll_speed_px: Option<u32>,
    /// built-in pages to cycle, e.g. --layout stats,icons
    #[arg(long, value_enum, value_delimiter = ',')]
    pub layout: Option<Vec<BuiltinLayout>>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, YAML and the given CLI, then validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lystats/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lystats/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lystats.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lystats.yaml", "config.yaml", "config/lystats.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.font.is_some()           { dst.font = src.font; }
    if src.layout.is_some()         { dst.layout = src.layout; }
    if src.pages.is_some()          { dst.pages = src.pages; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    // scheduler
    match (&mut dst.scheduler, src.scheduler) {
        (None, Some(c)) => dst.scheduler = Some(c),
        (Some(d), Some(s)) => merge_scheduler(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.rotate_deg.is_some()  { dst.rotate_deg = src.rotate_deg; }
    if src.invert.is_some()      { dst.invert = src.invert; }
    if src.brightness.is_some()  { dst.brightness = src.brightness; }
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.bus.is_some()         { dst.bus = src.bus; }
}

fn merge_scheduler(dst: &mut SchedulerConfig, src: SchedulerConfig) {
    if src.tick_interval_s.is_some()    { dst.tick_interval_s = src.tick_interval_s; }
    if src.metrics_interval_s.is_some() { dst.metrics_interval_s = src.metrics_interval_s; }
    if src.page_duration_s.is_some()    { dst.page_duration_s = src.page_duration_s; }
    if src.scroll_speed_px.is_some()    { dst.scroll_speed_px = src.scroll_speed_px; }
    if src.scroll_gap_px.is_some()      { dst.scroll_gap_px = src.scroll_gap_px; }
    if src.page_switch.is_some()        { dst.page_switch = src.page_switch; }
    if src.metrics_worker.is_some()     { dst.metrics_worker = src.metrics_worker; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                     { cfg.log_level = Some("debug".to_string()); }
    if cli.font.is_some()            { cfg.font = cli.font.clone(); }
    if cli.layout.is_some()          { cfg.layout = cli.layout.clone(); }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_rotate_deg.is_some()
        || cli.display_invert.is_some()
        || cli.display_brightness.is_some()
        || cli.driver.is_some()
        || cli.i2c_bus.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()       { display.width = cli.display_width; }
        if cli.display_height.is_some()      { display.height = cli.display_height; }
        if cli.display_rotate_deg.is_some()  { display.rotate_deg = cli.display_rotate_deg; }
        if cli.display_invert.is_some()      { display.invert = cli.display_invert; }
        if cli.display_brightness.is_some()  { display.brightness = cli.display_brightness; }
        if cli.driver.is_some()              { display.driver = cli.driver; }
        if let Some(path) = cli.i2c_bus.as_ref() {
            // keep a configured address, swap the device
            display.bus = Some(match display.bus_or_default() {
                BusConfig::I2c { address, speed_hz, .. } => BusConfig::I2c {
                    bus: path.clone(),
                    address,
                    speed_hz,
                },
            });
        }
    }

    let any_scheduler = cli.tick_interval_s.is_some()
        || cli.page_duration_s.is_some()
        || cli.scroll_speed_px.is_some();

    if any_scheduler && cfg.scheduler.is_none() {
        cfg.scheduler = Some(SchedulerConfig::default());
    }
    if let Some(scheduler) = cfg.scheduler.as_mut() {
        if cli.tick_interval_s.is_some()  { scheduler.tick_interval_s = cli.tick_interval_s; }
        if cli.page_duration_s.is_some()  { scheduler.page_duration_s = cli.page_duration_s; }
        if cli.scroll_speed_px.is_some()  { scheduler.scroll_speed_px = cli.scroll_speed_px; }
    }
}

fn positive_secs(name: &str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(s) if !(s.is_finite() && s > 0.0) => {
            Err(ConfigError::Validation(format!("scheduler {name} must be > 0 (got {s})")))
        }
        Some(s) if Duration::try_from_secs_f64(s).is_err() => {
            Err(ConfigError::Validation(format!("scheduler {name} is out of range (got {s})")))
        }
        _ => Ok(()),
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.width_or_default() == 0 || display.height_or_default() == 0 {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
            }
        }
        if display.driver == Some(DriverKind::Headless) && display.bus.is_some() {
            return Err(ConfigError::Validation("headless display takes no bus".into()));
        }
    }

    if let Some(scheduler) = cfg.scheduler.as_ref() {
        positive_secs("tick_interval_s", scheduler.tick_interval_s)?;
        positive_secs("metrics_interval_s", scheduler.metrics_interval_s)?;
        positive_secs("page_duration_s", scheduler.page_duration_s)?;
        if scheduler.scroll_speed_px == Some(0) {
            return Err(ConfigError::Validation("scheduler scroll_speed_px must be > 0".into()));
        }
    }

    // every page must build against the configured display
    let pages = LayoutManager::from_config(cfg).pages_for(cfg)?;
    if pages.is_empty() {
        return Err(ConfigError::Validation("no pages to show".into()));
    }
    Ok(())
}
