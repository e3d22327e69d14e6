//! Refresh scheduler
//!
//! Background task that drives periodic and on-change series fetches and
//! guarantees that at most one semantically current in-flight result is ever
//! applied. Every fetch is tagged with the query it was issued for; when a
//! result comes back, the tag is compared against the currently selected
//! query and mismatches are discarded without a state transition. Network
//! completion order is unordered, so this suppression rule is what keeps a
//! slow response for an old selection from overwriting a newer one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use livechart_client::{AnalysisClient, RawSeriesResponse};
use livechart_core::{FetchResult, FetchState, MarketQuery, SeriesPayload};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::normalizer::normalize;

/// Fixed dashboard refresh cadence
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Capability to fetch a raw series payload for a query
///
/// `AnalysisClient` is the production implementation; tests drive the
/// scheduler with scripted stubs.
#[async_trait]
pub trait SeriesFetch: Send + Sync + 'static {
    async fn fetch_series(&self, query: &MarketQuery) -> FetchResult<RawSeriesResponse>;
}

#[async_trait]
impl SeriesFetch for AnalysisClient {
    async fn fetch_series(&self, query: &MarketQuery) -> FetchResult<RawSeriesResponse> {
        AnalysisClient::fetch_series(self, query).await
    }
}

/// Configuration for the refresh scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often to re-fetch the current query
    pub refresh_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

/// Drives periodic + on-change refreshes for the live market query
///
/// The scheduler task is aborted on [`stop`](RefreshScheduler::stop) and on
/// drop, so the recurring timer never outlives its owner. In-flight requests
/// are not aborted; their completions land on a closed channel and are never
/// applied.
#[derive(Debug)]
pub struct RefreshScheduler {
    state_rx: watch::Receiver<FetchState>,
    task: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Spawn the scheduler task
    ///
    /// Issues an immediate fetch for the query current at spawn, then
    /// re-fetches on every interval tick, always for the query current at
    /// tick time. A query change triggers an immediate fetch and restarts
    /// the periodic phase.
    pub fn start<F: SeriesFetch>(
        fetcher: Arc<F>,
        query_rx: watch::Receiver<MarketQuery>,
        config: SchedulerConfig,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(FetchState::Idle);

        let task = tokio::spawn(run_loop(fetcher, query_rx, state_tx, config));

        Self { state_rx, task }
    }

    /// Subscribe to fetch-state transitions
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state_rx.clone()
    }

    /// Snapshot of the current fetch state
    pub fn state(&self) -> FetchState {
        self.state_rx.borrow().clone()
    }

    /// Halt the timer; outstanding results are never applied
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Completed fetch: the query it was issued for plus its normalized outcome
type Completion = (MarketQuery, FetchResult<SeriesPayload>);

async fn run_loop<F: SeriesFetch>(
    fetcher: Arc<F>,
    mut query_rx: watch::Receiver<MarketQuery>,
    state_tx: watch::Sender<FetchState>,
    config: SchedulerConfig,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<Completion>(16);

    // The first tick completes immediately and doubles as the startup fetch.
    let mut ticker = interval(config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let query = query_rx.borrow().clone();
                issue_fetch(&fetcher, query, &done_tx, &state_tx);
            }
            changed = query_rx.changed() => {
                if changed.is_err() {
                    // Selector gone; nothing can ever retarget us again.
                    break;
                }
                let query = query_rx.borrow_and_update().clone();
                ticker.reset();
                issue_fetch(&fetcher, query, &done_tx, &state_tx);
            }
            Some((issued_for, result)) = done_rx.recv() => {
                apply_completion(&state_tx, &query_rx, issued_for, result);
            }
        }
    }
}

/// Spawn one tagged fetch and hand the normalized outcome back on `done_tx`
fn issue_fetch<F: SeriesFetch>(
    fetcher: &Arc<F>,
    query: MarketQuery,
    done_tx: &mpsc::Sender<Completion>,
    state_tx: &watch::Sender<FetchState>,
) {
    // Publish Loading only when targeting a different query than the one the
    // current state belongs to. Same-query refresh ticks keep the last state
    // visible until the new result resolves.
    if state_tx.borrow().query() != Some(&query) {
        let _ = state_tx.send(FetchState::Loading {
            query: query.clone(),
        });
    }

    debug!("Issuing fetch for {}", query);

    let fetcher = Arc::clone(fetcher);
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = match fetcher.fetch_series(&query).await {
            Ok(raw) => normalize(raw, &query),
            Err(error) => Err(error),
        };
        // Receiver may be gone after stop(); the result is simply dropped.
        let _ = done_tx.send((query, result)).await;
    });
}

/// Apply a completion unless its tag no longer matches the live query
fn apply_completion(
    state_tx: &watch::Sender<FetchState>,
    query_rx: &watch::Receiver<MarketQuery>,
    issued_for: MarketQuery,
    result: FetchResult<SeriesPayload>,
) {
    let current = query_rx.borrow();
    if issued_for != *current {
        debug!(
            "Discarding stale response for {} (current: {})",
            issued_for, *current
        );
        return;
    }
    drop(current);

    let state = match result {
        Ok(payload) => FetchState::Loaded {
            query: issued_for,
            payload,
        },
        Err(error) => {
            warn!("Fetch for {} failed: {}", issued_for, error);
            FetchState::Failed {
                query: issued_for,
                error,
            }
        }
    };

    let _ = state_tx.send(state);
}
