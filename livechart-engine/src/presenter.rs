//! Presentation mapping
//!
//! Derives the discrete card states the view renders next to the chart:
//! the signal badge, the confidence tier, the price-change sign, and the
//! formatted stat values. All pure derivations from a normalized payload.

use livechart_core::{Prediction, PredictionDirection, SeriesPayload, Signal};
use rust_decimal::Decimal;
use serde::Serialize;

/// Discretized bucket for the ML confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Bucket a 0-100 confidence score; lower bounds are inclusive
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 70.0 {
            ConfidenceTier::High
        } else if confidence >= 55.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "HIGH",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::Low => "LOW",
        }
    }
}

/// Sign of the 24h price change; zero counts as positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Positive,
    Negative,
}

impl ChangeDirection {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 0.0 {
            ChangeDirection::Positive
        } else {
            ChangeDirection::Negative
        }
    }
}

/// Stats row above the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    pub symbol: String,
    pub timeframe: &'static str,
    pub data_points: usize,
}

/// Sidebar card for the forex ML prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionCard {
    pub direction: PredictionDirection,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub signal_strength: String,
    /// Current price formatted to 5 decimals, as the pair cards show it
    pub current_price: String,
    /// Signed percent change over 24h, formatted to 2 decimals
    pub change_24h: String,
    pub change_direction: ChangeDirection,
    pub message: String,
}

impl PredictionCard {
    pub fn from_prediction(prediction: &Prediction) -> Self {
        Self {
            direction: prediction.direction,
            confidence: prediction.confidence,
            tier: ConfidenceTier::from_confidence(prediction.confidence),
            signal_strength: prediction.signal_strength.clone(),
            current_price: format!("{:.5}", prediction.current_price),
            change_24h: format!("{:+.2}%", prediction.price_change_24h),
            change_direction: ChangeDirection::from_percent(prediction.price_change_24h),
            message: prediction.message.clone(),
        }
    }
}

/// Everything the sidebar and stats row need for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCards {
    pub stats: StatsRow,
    pub badge: Signal,
    /// Close of the latest bar; absent while awaiting data, shown blank
    pub latest_price: Option<Decimal>,
    /// Present only on the forex path
    pub prediction: Option<PredictionCard>,
}

/// The badge value for the current payload
///
/// Crypto payloads carry `latest_signal`, forex payloads `technical_signal`;
/// whichever is present wins, and no recognizable signal reads as WAIT.
pub fn signal_badge(payload: &SeriesPayload) -> Signal {
    payload
        .latest_signal
        .or(payload.technical_signal)
        .unwrap_or(Signal::Wait)
}

/// Derive all card states from a payload
pub fn dashboard_cards(payload: &SeriesPayload) -> DashboardCards {
    DashboardCards {
        stats: StatsRow {
            symbol: payload.symbol.clone(),
            timeframe: payload.timeframe.label(),
            data_points: payload.bars.len(),
        },
        badge: signal_badge(payload),
        latest_price: payload.latest_close(),
        prediction: payload.prediction.as_ref().map(PredictionCard::from_prediction),
    }
}
