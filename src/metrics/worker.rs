/*
 *  metrics/worker.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Background metrics polling published over a watch channel
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
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{MetricsProvider, MetricsSnapshot};

/// Polls a provider off the render path.
///
/// The provider runs on the blocking pool so slow `/proc` or disk
/// queries never stall a frame; the render loop only ever picks up the
/// most recent finished snapshot.
pub struct MetricsWorker {
    rx: watch::Receiver<Arc<MetricsSnapshot>>,
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MetricsWorker {
    /// Start polling every `interval`. Must be called inside a tokio runtime.
    pub fn spawn(mut provider: Box<dyn MetricsProvider>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(Arc::new(MetricsSnapshot::placeholder()));
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let joined = tokio::task::spawn_blocking(move || {
                            let snap = provider.fetch();
                            (provider, snap)
                        })
                        .await;
                        match joined {
                            Ok((p, snap)) => {
                                provider = p;
                                if tx.send(Arc::new(snap)).is_err() {
                                    debug!("Metrics receiver gone, stopping worker");
                                    break;
                                }
                            }
                            Err(e) => {
                                error!("Metrics provider panicked: {}", e);
                                break;
                            }
                        }
                    }
                    _ = stop_rx.recv() => {
                        info!("Metrics worker received stop signal. Exiting.");
                        break;
                    }
                }
            }
        });

        Self {
            rx,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Newest snapshot if one arrived since the last call. Never blocks.
    pub fn latest(&mut self) -> Option<Arc<MetricsSnapshot>> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Most recent snapshot, whether or not it has been seen.
    pub fn current(&self) -> Arc<MetricsSnapshot> {
        self.rx.borrow().clone()
    }

    /// Ask the polling task to finish and wait for it.
    pub async fn stop(&mut self) {
        if let Some(sender) = self.stop_tx.take() {
            // a closed channel means the task already exited
            let _ = sender.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .unwrap_or_else(|e| error!("Metrics worker failed to join: {}", e));
        }
        info!("Metrics worker stopped.");
    }
}

impl Drop for MetricsWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricKey;

    #[tokio::test]
    async fn test_worker_publishes_snapshots() {
        let mut count = 0u32;
        let provider = move || {
            count += 1;
            MetricsSnapshot::default().with(MetricKey::Cpu, count.to_string())
        };
        let mut worker = MetricsWorker::spawn(Box::new(provider), Duration::from_millis(10));

        let mut seen = None;
        for _ in 0..200 {
            if let Some(snap) = worker.latest() {
                seen = Some(snap);
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let snap = seen.expect("worker never published");
        assert_ne!(snap.display(MetricKey::Cpu), "N/A");

        worker.stop().await;
    }

    #[tokio::test]
    async fn test_latest_is_none_until_changed() {
        let provider = || MetricsSnapshot::default().with(MetricKey::Time, "12:00:00");
        let mut worker = MetricsWorker::spawn(Box::new(provider), Duration::from_secs(3600));

        // first tick of an interval completes immediately
        for _ in 0..200 {
            if worker.latest().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(worker.current().display(MetricKey::Time), "12:00:00");
        // nothing new until the next hour
        assert!(worker.latest().is_none());

        worker.stop().await;
    }
}
