//! HTTP client for the market-analysis backend
//!
//! Wraps the two REST endpoints the dashboard polls and the raw response
//! types they return. Raw types mirror the wire format; the engine's
//! normalizer converts them into livechart-core shapes.

pub mod client;
pub mod types;

pub use client::{AnalysisClient, DEFAULT_API_BASE};
pub use types::{RawBar, RawPrediction, RawSeriesResponse};
