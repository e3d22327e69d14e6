//! Refresh scheduling and view-state reconciliation for the Livechart dashboard
//!
//! This crate provides the service layer between the analysis backend client
//! and the rendered view: query selection, periodic refresh with stale-result
//! suppression, payload normalization, and the pure transforms that turn a
//! series payload into chart overlays and card states.

pub mod dashboard;
pub mod normalizer;
pub mod overlay;
pub mod presenter;
pub mod scheduler;
pub mod selector;

pub use dashboard::{ChartSurface, Dashboard, ViewState};
pub use normalizer::normalize;
pub use overlay::{chart_series, CandlePoint, ChartSeries, LinePoint, MarkerPoint};
pub use presenter::{
    dashboard_cards, signal_badge, ChangeDirection, ConfidenceTier, DashboardCards,
    PredictionCard, StatsRow,
};
pub use scheduler::{RefreshScheduler, SchedulerConfig, SeriesFetch};
pub use selector::MarketQuerySelector;
