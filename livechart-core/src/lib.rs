//! Core types for the Livechart market dashboard
//!
//! This crate defines the shared data structures used across the dashboard,
//! including market queries, price series, fetch state, and the error taxonomy.

pub mod error;
pub mod query;
pub mod series;
pub mod state;

pub use error::{FetchError, FetchResult};
pub use query::{InvalidSymbol, MarketQuery, MarketType, QueryPatch, Timeframe};
pub use series::{Bar, BarSignal, Prediction, PredictionDirection, SeriesPayload, Signal};
pub use state::FetchState;
