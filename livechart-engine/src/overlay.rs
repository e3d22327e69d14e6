//! Chart overlay builder
//!
//! Pure transform from a bar sequence to the declarative series the charting
//! surface draws: OHLC candles, the two SMA lines, and buy/sell markers.
//! Everything here is recomputed from the input bars on every call; nothing
//! is cached between renders.

use chrono::{DateTime, Utc};
use livechart_core::{Bar, BarSignal};
use rust_decimal::Decimal;
use serde::Serialize;

/// One candle of the OHLC series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlePoint {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

/// One point of an indicator line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

/// One buy/sell marker, positioned just off the bar it annotates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPoint {
    pub timestamp: DateTime<Utc>,
    pub y: Decimal,
}

/// Chart-ready series bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub candles: Vec<CandlePoint>,
    pub sma_20: Vec<LinePoint>,
    pub sma_50: Vec<LinePoint>,
    pub buy_markers: Vec<MarkerPoint>,
    pub sell_markers: Vec<MarkerPoint>,
}

/// Build the chart series for a bar sequence
///
/// Returns `None` for an empty sequence: "nothing to plot" is a distinct
/// state from "plot with zero points" and callers render it as an explicit
/// no-data chart. Buy markers sit 1% below the bar's low, sell markers 1%
/// above its high; bars without a BUY/SELL annotation produce no marker.
pub fn chart_series(bars: &[Bar]) -> Option<ChartSeries> {
    if bars.is_empty() {
        return None;
    }

    let candles = bars
        .iter()
        .map(|bar| CandlePoint {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
        .collect();

    let sma_20 = indicator_line(bars, |bar| bar.sma_20);
    let sma_50 = indicator_line(bars, |bar| bar.sma_50);

    let buy_markers = bars
        .iter()
        .filter(|bar| bar.signal == Some(BarSignal::Buy))
        .map(|bar| MarkerPoint {
            timestamp: bar.timestamp,
            y: buy_marker_y(bar.low),
        })
        .collect();

    let sell_markers = bars
        .iter()
        .filter(|bar| bar.signal == Some(BarSignal::Sell))
        .map(|bar| MarkerPoint {
            timestamp: bar.timestamp,
            y: sell_marker_y(bar.high),
        })
        .collect();

    Some(ChartSeries {
        candles,
        sma_20,
        sma_50,
        buy_markers,
        sell_markers,
    })
}

/// Collect an indicator line, skipping bars where the value is absent
fn indicator_line<F>(bars: &[Bar], value: F) -> Vec<LinePoint>
where
    F: Fn(&Bar) -> Option<Decimal>,
{
    bars.iter()
        .filter_map(|bar| {
            value(bar).map(|value| LinePoint {
                timestamp: bar.timestamp,
                value,
            })
        })
        .collect()
}

/// Buy markers render slightly below the candle
fn buy_marker_y(low: Decimal) -> Decimal {
    low * Decimal::new(99, 2)
}

/// Sell markers render slightly above the candle
fn sell_marker_y(high: Decimal) -> Decimal {
    high * Decimal::new(101, 2)
}
