//! Price series and signal types
//!
//! These are the normalized shapes the engine works with, produced from the
//! backend's wire payloads by the response normalizer. Bars are read-only to
//! the dashboard and ordered by timestamp ascending with no duplicates.

use crate::query::Timeframe;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-bar trading annotation
///
/// Only crossover bars carry one; everything else (including the backend's
/// HOLD filler) normalizes to no annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BarSignal {
    Buy,
    Sell,
}

/// Summary trading signal shown on the dashboard cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Wait,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Wait => "WAIT",
        }
    }
}

/// One OHLC candle plus optional indicator/signal annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Start time of the bar's bucket
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,

    /// 20-period simple moving average, absent for the warm-up bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<Decimal>,

    /// 50-period simple moving average, absent for the warm-up bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_50: Option<Decimal>,

    /// Crossover annotation, if this bar produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<BarSignal>,
}

/// Direction the ML model expects the next move to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredictionDirection {
    Up,
    Down,
    /// No usable direction (insufficient data or an unrecognized answer)
    Flat,
}

impl PredictionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionDirection::Up => "UP",
            PredictionDirection::Down => "DOWN",
            PredictionDirection::Flat => "FLAT",
        }
    }
}

/// ML prediction details attached to forex payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub direction: PredictionDirection,
    /// Model confidence for the predicted class, 0-100
    pub confidence: f64,
    /// Backend's qualitative strength label (STRONG/MODERATE/WEAK)
    pub signal_strength: String,
    pub current_price: Decimal,
    /// Percent change over the last 24 hours
    pub price_change_24h: f64,
    /// Human-readable summary from the predictor
    pub message: String,
}

/// Normalized series payload for one (query, fetch) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Bars ordered by timestamp ascending; empty means "no data yet"
    pub bars: Vec<Bar>,
    /// Present only for forex queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    /// Latest technical signal (forex path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_signal: Option<Signal>,
    /// Latest per-bar signal summary (crypto path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_signal: Option<Signal>,
}

impl SeriesPayload {
    /// The most recent bar, if any data has arrived
    pub fn latest_bar(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close of the most recent bar; `None` while awaiting data
    pub fn latest_close(&self) -> Option<Decimal> {
        self.latest_bar().map(|bar| bar.close)
    }
}
