//! Running every model, once or on a timer.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use barometer_core::{dataset_hash, SignalEngine};

use crate::models::ModelRegistry;
use crate::snapshot::{ModelOutput, Snapshot};
use crate::source::DataSource;

/// Granularity at which a sleeping loop notices a stop request.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Fetch and process every registered model.
///
/// A failed fetch drops only that index (recorded in `skipped`). A model with
/// no fetchable index is left out of the snapshot entirely.
pub fn run_all_models(
    registry: &ModelRegistry,
    engine: &SignalEngine,
    source: &dyn DataSource,
) -> Snapshot {
    let mut snapshot = Snapshot::new(Utc::now());

    for (key, spec) in registry.iter() {
        let mut inputs = BTreeMap::new();
        let mut fetch_failures = BTreeMap::new();
        for &index in &spec.indices {
            match source.fetch(spec, index) {
                Ok(table) => {
                    debug!(model = key, %index, rows = table.height(), "fetched");
                    inputs.insert(index, table);
                }
                Err(e) => {
                    warn!(model = key, %index, source = source.name(), error = %e, "fetch failed");
                    fetch_failures.insert(index, format!("fetch failed: {e}"));
                }
            }
        }

        if inputs.is_empty() {
            warn!(model = key, "{} returned no data; retry later", spec.display_name);
            continue;
        }

        let mut results = (spec.processor)(engine, &inputs);
        results.skipped.extend(fetch_failures);

        let gauges = results
            .series
            .iter()
            .filter_map(|(index, series)| engine.gauge(series).map(|g| (*index, g)))
            .collect();
        let dataset_hashes = inputs
            .iter()
            .map(|(index, table)| (*index, dataset_hash(table)))
            .collect();

        info!(
            model = key,
            indices = results.len(),
            skipped = results.skipped.len(),
            "model processed"
        );
        snapshot.models.insert(
            key.to_string(),
            ModelOutput {
                display_name: spec.display_name.clone(),
                results,
                gauges,
                dataset_hashes,
            },
        );
    }

    snapshot
}

/// Background thread that re-runs every model on a fixed interval and sends
/// each snapshot down a channel.
///
/// Stops when the stop flag is set, when the receiver is dropped, or when the
/// loop itself is dropped.
pub struct RefreshLoop {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshLoop {
    /// The first cycle runs immediately.
    pub fn spawn(
        registry: ModelRegistry,
        engine: SignalEngine,
        source: Arc<dyn DataSource>,
        interval: Duration,
        tx: Sender<Snapshot>,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("barometer-refresh".into())
            .spawn(move || refresh_loop(&registry, &engine, source.as_ref(), interval, &tx, &flag))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Shared flag; setting it ends the loop after the current cycle.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Request a stop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("refresh thread panicked");
            }
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn refresh_loop(
    registry: &ModelRegistry,
    engine: &SignalEngine,
    source: &dyn DataSource,
    interval: Duration,
    tx: &Sender<Snapshot>,
    stop: &AtomicBool,
) {
    let mut cycle = 0u64;
    while !stop.load(Ordering::Relaxed) {
        cycle += 1;
        info!(cycle, "refreshing models");
        let snapshot = run_all_models(registry, engine, source);
        if tx.send(snapshot).is_err() {
            debug!("snapshot receiver dropped; stopping refresh loop");
            break;
        }
        info!(cycle, next_in_secs = interval.as_secs(), "models refreshed");

        sleep_until_next_cycle(interval, stop);
    }
}

/// Sleep for `interval` or until `stop` is set. An interval too large to
/// express as an `Instant` waits on the stop flag alone.
fn sleep_until_next_cycle(interval: Duration, stop: &AtomicBool) {
    let deadline = Instant::now().checked_add(interval);
    while !stop.load(Ordering::Relaxed) {
        let nap = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                STOP_POLL.min(deadline - now)
            }
            None => STOP_POLL,
        };
        thread::sleep(nap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticSource;
    use barometer_core::EngineConfig;
    use std::sync::mpsc;

    fn synthetic(rows: usize) -> SyntheticSource {
        SyntheticSource::new(&EngineConfig::default(), rows, 11)
    }

    #[test]
    fn run_all_models_fills_every_index() {
        let snapshot = run_all_models(
            &ModelRegistry::builtin(),
            &SignalEngine::default(),
            &synthetic(120),
        );
        let out = snapshot.get("spx_barometer").unwrap();
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.dataset_hashes.len(), 2);
        assert!(out.results.skipped.is_empty());
    }

    #[test]
    fn loop_sends_and_stops() {
        let (tx, rx) = mpsc::channel();
        let refresh = RefreshLoop::spawn(
            ModelRegistry::builtin(),
            SignalEngine::default(),
            Arc::new(synthetic(60)),
            Duration::from_secs(3600),
            tx,
        )
        .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(30)).unwrap();
        assert!(first.get("spx_barometer").is_some());

        refresh.stop();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn unbounded_interval_keeps_thread_alive() {
        let (tx, rx) = mpsc::channel();
        let refresh = RefreshLoop::spawn(
            ModelRegistry::builtin(),
            SignalEngine::default(),
            Arc::new(synthetic(40)),
            Duration::from_secs(u64::MAX),
            tx,
        )
        .unwrap();

        rx.recv_timeout(Duration::from_secs(30)).unwrap();
        thread::sleep(Duration::from_millis(300));
        assert!(!refresh.is_finished());

        refresh.stop();
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn sleep_returns_once_stopped() {
        let stop = AtomicBool::new(true);
        let started = Instant::now();
        sleep_until_next_cycle(Duration::from_secs(u64::MAX), &stop);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn loop_ends_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel();
        let refresh = RefreshLoop::spawn(
            ModelRegistry::builtin(),
            SignalEngine::default(),
            Arc::new(synthetic(40)),
            Duration::from_millis(1),
            tx,
        )
        .unwrap();
        drop(rx);

        let started = Instant::now();
        while !refresh.is_finished() && started.elapsed() < Duration::from_secs(30) {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(refresh.is_finished());
    }
}
