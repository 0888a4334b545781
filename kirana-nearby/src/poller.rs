use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kirana_core::location::resolve_or_default;
use kirana_core::{DispatchGateway, LocationResolver};
use kirana_shared::{GeoPoint, HubRecord};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Cadence of the recurring refresh while a term is active.
    pub poll_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(8),
        }
    }
}

#[derive(Default)]
struct QueryState {
    term: String,
    results: Vec<HubRecord>,
    /// Bumped on every term change and on shutdown. A query captures the
    /// generation at issue time; its completion applies only if that
    /// generation still stands, which is what discards stale responses.
    generation: u64,
}

struct PollerInner {
    gateway: Arc<dyn DispatchGateway>,
    origin: GeoPoint,
    state: Mutex<QueryState>,
    shutdown: AtomicBool,
    results_tx: watch::Sender<Vec<HubRecord>>,
    /// Held to keep the watch channel open across periods with no external
    /// subscribers; without a live receiver `send` fails and the published
    /// value is dropped.
    _results_rx: watch::Receiver<Vec<HubRecord>>,
}

/// Recurring proximity search keyed by a mutable term and a fixed origin.
///
/// The origin is resolved once at start (falling back to the default
/// coordinate) and immutable afterward. Polling is active exactly while the
/// term is non-empty; clearing the term cancels the recurring query and
/// empties the held results synchronously.
pub struct ProximityPoller {
    inner: Arc<PollerInner>,
    schedule: JoinHandle<()>,
}

impl ProximityPoller {
    /// Resolve the origin once and start the recurring schedule. The first
    /// query only goes out once a non-empty term is set.
    pub async fn start(
        gateway: Arc<dyn DispatchGateway>,
        resolver: &dyn LocationResolver,
        config: PollerConfig,
    ) -> Self {
        let origin = resolve_or_default(resolver).await;
        debug!("proximity poller origin {:.4},{:.4}", origin.lat, origin.lon);

        let (results_tx, results_rx) = watch::channel(Vec::new());
        let inner = Arc::new(PollerInner {
            gateway,
            origin,
            state: Mutex::new(QueryState::default()),
            shutdown: AtomicBool::new(false),
            results_tx,
            _results_rx: results_rx,
        });
        let schedule = tokio::spawn(run_schedule(inner.clone(), config.poll_interval));

        Self { inner, schedule }
    }

    /// Replace the active search term.
    ///
    /// A new non-empty term issues an immediate query and supersedes any
    /// query still in flight. An empty (or all-whitespace) term stops
    /// polling and clears the held results before returning.
    pub fn set_term(&self, term: &str) {
        let term = term.trim();
        let issue = {
            let mut state = self.inner.state.lock().expect("poller state poisoned");
            if term.is_empty() {
                if !state.term.is_empty() {
                    debug!("search term cleared, polling paused");
                }
                state.term.clear();
                state.generation += 1;
                state.results.clear();
                let _ = self.inner.results_tx.send(Vec::new());
                None
            } else if term != state.term {
                state.term = term.to_string();
                state.generation += 1;
                info!("search term set to {:?}", term);
                Some((state.term.clone(), state.generation))
            } else {
                None
            }
        };

        if let Some((term, generation)) = issue {
            tokio::spawn(run_query(self.inner.clone(), term, generation));
        }
    }

    /// Latest published result set. Overwritten wholesale on refresh; a
    /// value-identical refresh is suppressed and does not signal.
    pub fn results(&self) -> watch::Receiver<Vec<HubRecord>> {
        self.inner.results_tx.subscribe()
    }

    pub fn origin(&self) -> GeoPoint {
        self.inner.origin
    }

    /// Stop the schedule. Safe to call repeatedly; no query is issued and
    /// no in-flight completion is applied afterward.
    pub fn shutdown(&self) {
        if self.inner.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.inner.state.lock().expect("poller state poisoned");
        state.generation += 1;
        self.schedule.abort();
        debug!("proximity poller shut down");
    }
}

impl Drop for ProximityPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_schedule(inner: Arc<PollerInner>, poll_interval: Duration) {
    let mut ticker =
        tokio::time::interval_at(tokio::time::Instant::now() + poll_interval, poll_interval);
    loop {
        ticker.tick().await;
        if inner.shutdown.load(Ordering::SeqCst) {
            return;
        }
        let pending = {
            let state = inner.state.lock().expect("poller state poisoned");
            if state.term.is_empty() {
                None
            } else {
                Some((state.term.clone(), state.generation))
            }
        };
        let Some((term, generation)) = pending else {
            continue;
        };
        run_query(inner.clone(), term, generation).await;
    }
}

async fn run_query(inner: Arc<PollerInner>, term: String, generation: u64) {
    let outcome = inner.gateway.query_nearby(&term, inner.origin).await;

    if inner.shutdown.load(Ordering::SeqCst) {
        return;
    }
    let mut state = inner.state.lock().expect("poller state poisoned");
    if state.generation != generation {
        debug!("discarding stale result for {:?}", term);
        return;
    }

    match outcome {
        Ok(hubs) => {
            if hubs == state.results {
                debug!("results for {:?} unchanged", term);
                return;
            }
            info!("{} hubs near origin for {:?}", hubs.len(), term);
            state.results = hubs.clone();
            let _ = inner.results_tx.send(hubs);
        }
        Err(e) => {
            warn!("proximity query for {:?} failed: {}", term, e);
            if !state.results.is_empty() {
                state.results.clear();
                let _ = inner.results_tx.send(Vec::new());
            }
        }
    }
}
