/*
 *  main.rs
 *
 *  LyStats - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info, warn};

use tokio::signal::unix::{signal, SignalKind};

use lystats::config::{self, Config};
use lystats::display::{
    DisplayDriverFactory, DisplayScheduler, LayoutManager, MetricsFeed,
};
use lystats::metrics::{MetricsWorker, SystemMetrics};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

fn build_scheduler(cfg: &Config) -> Result<DisplayScheduler> {
    let display_cfg = cfg.display.clone().unwrap_or_default();
    let mut sink = DisplayDriverFactory::create_from_config(&display_cfg)
        .context("creating display driver")?;
    sink.init().context("initialising display")?;

    let pages = LayoutManager::from_config(cfg)
        .pages_for(cfg)
        .context("building pages")?;
    let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
    info!("Pages: {}", names.join(", "));

    let scheduler_cfg = cfg.scheduler();
    let options = scheduler_cfg.options();
    let feed = if scheduler_cfg.metrics_worker() {
        info!("Collecting metrics on a background task");
        MetricsFeed::Worker(MetricsWorker::spawn(
            Box::new(SystemMetrics::new()),
            options.metrics_interval,
        ))
    } else {
        MetricsFeed::Inline(Box::new(SystemMetrics::new()))
    };

    DisplayScheduler::new(sink, pages, feed, options).context("starting display scheduler")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load().context("loading configuration")?;

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let mut scheduler = build_scheduler(&cfg)?;

    let outcome = tokio::select! {
        res = signal_handler() => res,
        res = scheduler.run() => res.context("display loop"),
    };

    scheduler.shutdown().await;
    if let Err(e) = scheduler.blank() {
        warn!("Could not blank display on exit: {}", e);
    }

    match outcome {
        Ok(()) => {
            info!("Shutdown complete after {} frames", scheduler.frames());
            Ok(())
        }
        Err(e) => {
            error!("Exiting: {:#}", e);
            Err(e)
        }
    }
}
