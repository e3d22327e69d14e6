//! Dashboard composition
//!
//! Ties the selector, scheduler, overlay builder, and presentation mapper
//! together and owns view-state reconciliation: once any payload has been
//! shown, later loading or failed fetches keep the last good payload on
//! screen instead of flashing back to blank.

use std::sync::Arc;

use livechart_core::{
    FetchError, FetchState, InvalidSymbol, MarketQuery, QueryPatch, SeriesPayload,
};
use tokio::sync::watch;
use tracing::info;

use crate::overlay::{chart_series, ChartSeries};
use crate::presenter::{dashboard_cards, DashboardCards};
use crate::scheduler::{RefreshScheduler, SchedulerConfig, SeriesFetch};
use crate::selector::MarketQuerySelector;

/// Charting capability the dashboard draws on
///
/// The widget is a black box: it accepts a declarative series description
/// and a title, and nothing about the draw comes back.
pub trait ChartSurface: Send {
    fn draw(&mut self, series: &ChartSeries, title: &str);
}

/// What the view should show after one reconciliation step
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// First fetch still in flight, nothing ever shown
    Loading,
    /// A fetch failed before any payload ever loaded
    Failed { error: FetchError },
    /// A payload is on screen
    ///
    /// `chart` is `None` for the explicit no-data state (the payload loaded
    /// but carries no bars yet). `notice` carries the most recent fetch
    /// failure while the stale payload stays visible.
    Active {
        cards: DashboardCards,
        chart: Option<ChartSeries>,
        notice: Option<FetchError>,
    },
}

/// The live dashboard: selection, refresh, and render reconciliation
pub struct Dashboard<S: ChartSurface> {
    selector: MarketQuerySelector,
    scheduler: RefreshScheduler,
    state_rx: watch::Receiver<FetchState>,
    last_loaded: Option<SeriesPayload>,
    surface: S,
}

impl<S: ChartSurface> Dashboard<S> {
    /// Start a dashboard on the default crypto query
    pub fn start<F: SeriesFetch>(fetcher: Arc<F>, surface: S) -> Self {
        Self::start_with(
            fetcher,
            surface,
            MarketQuery::default_crypto(),
            SchedulerConfig::default(),
        )
    }

    /// Start a dashboard on a specific query and refresh config
    pub fn start_with<F: SeriesFetch>(
        fetcher: Arc<F>,
        surface: S,
        initial: MarketQuery,
        config: SchedulerConfig,
    ) -> Self {
        let selector = MarketQuerySelector::new(initial);
        let scheduler = RefreshScheduler::start(fetcher, selector.subscribe(), config);
        let state_rx = scheduler.subscribe();

        Self {
            selector,
            scheduler,
            state_rx,
            last_loaded: None,
            surface,
        }
    }

    /// Change the selection; the scheduler retargets automatically
    pub fn select(&self, patch: QueryPatch) -> Result<MarketQuery, InvalidSymbol> {
        self.selector.select(patch)
    }

    /// The currently selected query
    pub fn query(&self) -> MarketQuery {
        self.selector.current()
    }

    /// Wait for the next fetch-state transition and reconcile it
    ///
    /// Draws the chart on the surface when there is one to draw. Returns
    /// `None` once the scheduler is gone and no further transitions can
    /// arrive.
    pub async fn next_view(&mut self) -> Option<ViewState> {
        self.state_rx.changed().await.ok()?;
        let state = self.state_rx.borrow_and_update().clone();
        Some(self.reconcile(state))
    }

    /// Stop refreshing; in-flight results are discarded
    pub fn stop(&self) {
        self.scheduler.stop();
        info!("Dashboard stopped");
    }

    fn reconcile(&mut self, state: FetchState) -> ViewState {
        if let FetchState::Loaded { payload, .. } = &state {
            self.last_loaded = Some(payload.clone());
        }

        let payload = match &self.last_loaded {
            Some(payload) => payload,
            // Nothing ever loaded: loading spinner or a bare failure.
            None => {
                return match state {
                    FetchState::Failed { error, .. } => ViewState::Failed { error },
                    _ => ViewState::Loading,
                };
            }
        };

        let cards = dashboard_cards(payload);
        let chart = chart_series(&payload.bars);

        if let Some(chart) = &chart {
            self.surface.draw(chart, &payload.symbol);
        }

        ViewState::Active {
            cards,
            chart,
            notice: state.error().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SeriesFetch;
    use async_trait::async_trait;
    use livechart_client::RawSeriesResponse;
    use livechart_core::{FetchResult, MarketType, Signal};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetcher whose responses are scripted per market type
    struct ScriptedFetch {
        crypto_bars: usize,
        fail_crypto: Option<FetchError>,
    }

    #[async_trait]
    impl SeriesFetch for ScriptedFetch {
        async fn fetch_series(&self, query: &MarketQuery) -> FetchResult<RawSeriesResponse> {
            tokio::time::sleep(Duration::from_millis(1)).await;

            if query.market_type == MarketType::Crypto {
                if let Some(error) = &self.fail_crypto {
                    return Err(error.clone());
                }
            }

            let bars: Vec<String> = (0..self.crypto_bars)
                .map(|i| {
                    format!(
                        r#"{{"timestamp": {}, "open": 100.0, "high": 101.0, "low": 99.0, "close": 100.5, "Signal": "BUY"}}"#,
                        1_722_506_400_000 + (i as i64) * 3_600_000
                    )
                })
                .collect();
            let json = format!(
                r#"{{"symbol": "{}", "timeframe": "1h", "data": [{}], "latest_signal": "BUY"}}"#,
                query.symbol,
                bars.join(",")
            );
            Ok(serde_json::from_str(&json).unwrap())
        }
    }

    /// Surface that counts draws
    #[derive(Default)]
    struct CountingSurface {
        draws: Arc<AtomicUsize>,
    }

    impl ChartSurface for CountingSurface {
        fn draw(&mut self, series: &ChartSeries, _title: &str) {
            assert!(!series.candles.is_empty());
            self.draws.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            refresh_interval: Duration::from_secs(60),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_series_renders_no_data_not_a_crash() {
        let fetcher = Arc::new(ScriptedFetch {
            crypto_bars: 0,
            fail_crypto: None,
        });
        let surface = CountingSurface::default();
        let draws = Arc::clone(&surface.draws);
        let mut dashboard = Dashboard::start_with(
            fetcher,
            surface,
            MarketQuery::default_crypto(),
            fast_config(),
        );

        // Loading first, then the empty payload.
        let view = loop {
            match dashboard.next_view().await.unwrap() {
                ViewState::Loading => continue,
                view => break view,
            }
        };

        match view {
            ViewState::Active {
                cards,
                chart,
                notice,
            } => {
                assert_eq!(chart, None);
                assert_eq!(cards.latest_price, None);
                assert_eq!(cards.stats.data_points, 0);
                assert_eq!(cards.badge, Signal::Buy);
                assert_eq!(notice, None);
            }
            other => panic!("expected active view, got {:?}", other),
        }
        assert_eq!(draws.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_series_is_drawn_on_the_surface() {
        let fetcher = Arc::new(ScriptedFetch {
            crypto_bars: 3,
            fail_crypto: None,
        });
        let surface = CountingSurface::default();
        let draws = Arc::clone(&surface.draws);
        let mut dashboard = Dashboard::start_with(
            fetcher,
            surface,
            MarketQuery::default_crypto(),
            fast_config(),
        );

        let view = loop {
            match dashboard.next_view().await.unwrap() {
                ViewState::Loading => continue,
                view => break view,
            }
        };

        match view {
            ViewState::Active { cards, chart, .. } => {
                let chart = chart.expect("chart should be present");
                assert_eq!(chart.candles.len(), 3);
                assert_eq!(cards.stats.data_points, 3);
            }
            other => panic!("expected active view, got {:?}", other),
        }
        assert_eq!(draws.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_before_any_data_is_a_bare_failure() {
        let fetcher = Arc::new(ScriptedFetch {
            crypto_bars: 0,
            fail_crypto: Some(FetchError::server(500)),
        });
        let mut dashboard = Dashboard::start_with(
            fetcher,
            CountingSurface::default(),
            MarketQuery::default_crypto(),
            fast_config(),
        );

        let view = loop {
            match dashboard.next_view().await.unwrap() {
                ViewState::Loading => continue,
                view => break view,
            }
        };

        assert_eq!(
            view,
            ViewState::Failed {
                error: FetchError::server(500)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_data_keeps_last_good_view() {
        let fetcher = Arc::new(ScriptedFetch {
            crypto_bars: 2,
            fail_crypto: None,
        });
        let mut dashboard = Dashboard::start_with(
            Arc::clone(&fetcher),
            CountingSurface::default(),
            MarketQuery::default_crypto(),
            fast_config(),
        );

        loop {
            if let ViewState::Active { .. } = dashboard.next_view().await.unwrap() {
                break;
            }
        }

        // Switching to forex fails (the stub omits the prediction block), but
        // the crypto payload must stay on screen with the failure surfaced.
        dashboard
            .select(QueryPatch::market_type(MarketType::Forex))
            .unwrap();

        let view = loop {
            match dashboard.next_view().await.unwrap() {
                ViewState::Active {
                    notice: Some(notice),
                    cards,
                    chart,
                } => break (notice, cards, chart),
                _ => continue,
            }
        };

        let (notice, cards, chart) = view;
        assert!(matches!(notice, FetchError::Schema(_)));
        assert_eq!(cards.stats.symbol, "BTC/USDT");
        assert!(chart.is_some());
    }
}
