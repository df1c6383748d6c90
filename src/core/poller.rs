//! Polling controller
//!
//! Owns the dashboard session state (current snapshot, history, liveness)
//! and the timer that refreshes it. Every cycle is fetch → parse → append →
//! publish; failures keep the last good data and only flip the status.
//!
//! Renderers subscribe to a `watch` channel and never mutate the state.
//! Each `start()` opens a new generation; a cycle only commits if its
//! generation is still current, so a slow response for a network the user
//! already switched away from is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::bridge_metrics::{parse_snapshot, BridgeSnapshot};
use super::clock::{Clock, SystemClock};
use super::history::History;
use super::network::Network;
use super::transport::MetricsTransport;
use crate::utils::{MAX_HISTORICAL_POINTS, REFRESH_INTERVAL};

/// Liveness of the most recent poll attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub is_online: bool,
    pub last_checked: DateTime<Utc>,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
}

impl NetworkStatus {
    fn unknown(now: DateTime<Utc>) -> Self {
        Self {
            is_online: false,
            last_checked: now,
            response_time_ms: 0,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub network: Network,
    pub snapshot: Option<BridgeSnapshot>,
    pub history: History,
    pub status: NetworkStatus,
    pub error: Option<String>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardState {
    fn empty(network: Network, history: History, now: DateTime<Utc>) -> Self {
        Self {
            network,
            snapshot: None,
            history,
            status: NetworkStatus::unknown(now),
            error: None,
            loading: false,
            last_updated: None,
        }
    }
}

/// Result of a single fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Succeeded,
    Failed,
    /// The controller moved on (stop or network switch) before the cycle finished
    Stale,
}

pub struct PollerOptions {
    pub interval: Duration,
    pub history_capacity: usize,
    pub clock: Arc<dyn Clock>,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: REFRESH_INTERVAL,
            history_capacity: MAX_HISTORICAL_POINTS,
            clock: Arc::new(SystemClock),
        }
    }
}

struct Shared {
    transport: Arc<dyn MetricsTransport>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<DashboardState>,
    generation: AtomicU64,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run_cycle(&self, generation: u64) -> CycleOutcome {
        let network = self.state.borrow().network;
        if !self.is_current(generation) {
            return CycleOutcome::Stale;
        }

        self.state.send_if_modified(|state| {
            if self.is_current(generation) && !state.loading {
                state.loading = true;
                true
            } else {
                false
            }
        });

        let started = Instant::now();
        let result = self.transport.fetch(network).await;
        let response_time_ms = started.elapsed().as_millis() as u64;
        let now = self.clock.now();

        let parsed = result.map(|text| parse_snapshot(&text));
        let mut outcome = CycleOutcome::Stale;

        self.state.send_if_modified(|state| {
            if !self.is_current(generation) || state.network != network {
                return false;
            }

            state.loading = false;
            match &parsed {
                Ok(snapshot) => {
                    state.history = std::mem::take(&mut state.history).append(snapshot.clone(), now);
                    state.snapshot = Some(snapshot.clone());
                    state.error = None;
                    state.last_updated = Some(now);
                    state.status = NetworkStatus {
                        is_online: true,
                        last_checked: now,
                        response_time_ms,
                    };
                    outcome = CycleOutcome::Succeeded;
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                    state.status = NetworkStatus {
                        is_online: false,
                        last_checked: now,
                        response_time_ms,
                    };
                    outcome = CycleOutcome::Failed;
                }
            }
            true
        });

        match (&outcome, &parsed) {
            (CycleOutcome::Succeeded, _) => {
                debug!(network = %network, response_time_ms, "metrics poll succeeded");
            }
            (CycleOutcome::Failed, Err(err)) => {
                warn!(network = %network, response_time_ms, error = %err, "metrics poll failed");
            }
            _ => {
                debug!(network = %network, generation, "discarding stale poll result");
            }
        }

        outcome
    }
}

/// Drives periodic polling for one selected network at a time.
///
/// Cheap to clone; clones share the same session state and timer.
#[derive(Clone)]
pub struct PollingController {
    shared: Arc<Shared>,
    interval: Duration,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PollingController {
    /// Create an idle controller. Nothing is fetched until `start` or `refresh`.
    pub fn new(transport: Arc<dyn MetricsTransport>, network: Network, options: PollerOptions) -> Self {
        let history = History::with_capacity(options.history_capacity);
        let (state, _) = watch::channel(DashboardState::empty(network, history, options.clock.now()));

        Self {
            shared: Arc::new(Shared {
                transport,
                clock: options.clock,
                state,
                generation: AtomicU64::new(0),
            }),
            interval: options.interval,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Start polling `network`: one cycle right away, then one per interval.
    ///
    /// Any previous timer is cancelled and the session state is reset.
    pub fn start(&self, network: Network) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let history = self.shared.state.borrow().history.cleared();
        let mut fresh = DashboardState::empty(network, history, self.shared.clock.now());
        fresh.loading = true;
        self.shared.state.send_replace(fresh);

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                shared.run_cycle(generation).await;
            }
        }));

        info!(network = %network, interval_secs = period.as_secs(), "started metrics polling");
    }

    /// Cancel the timer and any in-flight cycle. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        self.shared.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(handle) = task.take() {
            handle.abort();
            info!(network = %self.network(), "stopped metrics polling");
        }

        self.shared.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
    }

    /// Restart polling against another network with a clean history
    pub fn switch_network(&self, network: Network) {
        self.stop();
        self.start(network);
    }

    /// Run one cycle now for the current network (manual retry)
    pub async fn refresh(&self) -> CycleOutcome {
        let generation = self.shared.generation.load(Ordering::SeqCst);
        self.shared.run_cycle(generation).await
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.shared.state.subscribe()
    }

    /// Copy of the current session state
    pub fn current(&self) -> DashboardState {
        self.shared.state.borrow().clone()
    }

    pub fn network(&self) -> Network {
        self.shared.state.borrow().network
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
