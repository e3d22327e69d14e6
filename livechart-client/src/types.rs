//! Backend API response types
//!
//! These types mirror the analysis backend's JSON responses and are converted
//! to livechart-core types by the response normalizer. The backend serializes
//! pandas frames record-by-record, so bars carry extra indicator columns we
//! ignore, missing values arrive as null, and timestamps arrive either as ISO
//! strings (with or without an offset) or as epoch milliseconds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Response from GET /market-analysis/ and GET /forex-prediction/
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeriesResponse {
    /// Echoed crypto symbol (market-analysis responses)
    #[serde(default)]
    pub symbol: Option<String>,

    /// Echoed forex pair (forex-prediction responses)
    #[serde(default)]
    pub pair: Option<String>,

    #[serde(default)]
    pub timeframe: Option<String>,

    /// OHLC series with indicator annotations, oldest first
    #[serde(default)]
    pub data: Vec<RawBar>,

    /// ML prediction block, only on forex-prediction responses
    #[serde(default)]
    pub prediction: Option<RawPrediction>,

    /// Latest per-bar signal (market-analysis responses)
    #[serde(default)]
    pub latest_signal: Option<String>,

    /// Latest technical signal (forex-prediction responses)
    #[serde(default)]
    pub technical_signal: Option<String>,
}

/// One record of the backend's analyzed OHLC frame
#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,

    /// null for the SMA warm-up window
    #[serde(default, rename = "SMA_20")]
    pub sma_20: Option<Decimal>,

    /// null for the SMA warm-up window
    #[serde(default, rename = "SMA_50")]
    pub sma_50: Option<Decimal>,

    /// BUY/SELL on crossover bars, HOLD otherwise
    #[serde(default, rename = "Signal")]
    pub signal: Option<String>,

    #[serde(default)]
    pub volume: Option<Decimal>,
}

/// ML prediction block from GET /forex-prediction/
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    /// UP/DOWN, or WAIT when the model had too little data
    #[serde(default)]
    pub prediction: Option<String>,

    /// Model confidence, 0-100
    #[serde(default)]
    pub confidence: Option<f64>,

    /// STRONG/MODERATE/WEAK
    #[serde(default)]
    pub signal_strength: Option<String>,

    #[serde(default)]
    pub current_price: Option<Decimal>,

    #[serde(default)]
    pub price_change_24h: Option<f64>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Accept the timestamp formats the backend actually emits
///
/// RFC 3339 strings, tz-naive ISO strings (pandas `date_format='iso'` on a
/// naive index, treated as UTC), and integer epoch milliseconds (the ccxt
/// path before frame conversion).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an ISO-8601 timestamp or epoch milliseconds")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
                return Ok(with_offset.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
                return Ok(Utc.from_utc_datetime(&naive));
            }
            Err(E::custom(format!("unrecognized timestamp: {value}")))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            DateTime::from_timestamp_millis(value)
                .ok_or_else(|| E::custom(format!("epoch millis out of range: {value}")))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .ok_or_else(|| E::custom(format!("epoch millis out of range: {value}")))
        }
    }

    deserializer.deserialize_any(TimestampVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_crypto_analysis_response() {
        // Shape taken from the backend's market-analysis endpoint: extra
        // indicator columns, naive ISO timestamps, nulls for warm-up SMAs.
        let json = r#"{
            "symbol": "BTC/USDT",
            "timeframe": "1h",
            "data": [
                {
                    "timestamp": "2025-08-01T10:00:00.000",
                    "open": 45000.5, "high": 45500.0, "low": 44800.25, "close": 45250.0,
                    "volume": 1000000.0,
                    "SMA_20": null, "SMA_50": null,
                    "EMA_20": 45100.0, "RSI": 55.2, "ATR": 320.5,
                    "Signal": "HOLD", "SL": null, "TP": null
                },
                {
                    "timestamp": "2025-08-01T11:00:00.000",
                    "open": 45250.0, "high": 45900.0, "low": 45100.0, "close": 45800.0,
                    "volume": 1200000.0,
                    "SMA_20": 45120.75, "SMA_50": 44980.0,
                    "Signal": "BUY"
                }
            ],
            "latest_signal": "BUY"
        }"#;

        let response: RawSeriesResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.symbol.as_deref(), Some("BTC/USDT"));
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.latest_signal.as_deref(), Some("BUY"));
        assert!(response.prediction.is_none());

        let first = &response.data[0];
        assert_eq!(first.low, dec!(44800.25));
        assert_eq!(first.sma_20, None);
        assert_eq!(first.signal.as_deref(), Some("HOLD"));
        assert_eq!(first.timestamp.to_rfc3339(), "2025-08-01T10:00:00+00:00");

        let second = &response.data[1];
        assert_eq!(second.sma_20, Some(dec!(45120.75)));
        assert_eq!(second.signal.as_deref(), Some("BUY"));
        assert!(second.timestamp > first.timestamp);
    }

    #[test]
    fn parses_forex_prediction_response() {
        let json = r#"{
            "pair": "EUR/USD",
            "timeframe": "1h",
            "prediction": {
                "prediction": "UP",
                "confidence": 67.5,
                "signal_strength": "MODERATE",
                "current_price": 1.0852,
                "price_change_24h": -0.12,
                "message": "MODERATE UP signal with 67.5% confidence"
            },
            "data": [
                {
                    "timestamp": "2025-08-01T10:00:00.000Z",
                    "open": 1.0845, "high": 1.0860, "low": 1.0840, "close": 1.0852,
                    "SMA_20": 1.0848, "SMA_50": 1.0830, "Signal": "SELL"
                }
            ],
            "technical_signal": "SELL"
        }"#;

        let response: RawSeriesResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.pair.as_deref(), Some("EUR/USD"));
        assert_eq!(response.technical_signal.as_deref(), Some("SELL"));

        let prediction = response.prediction.unwrap();
        assert_eq!(prediction.prediction.as_deref(), Some("UP"));
        assert_eq!(prediction.confidence, Some(67.5));
        assert_eq!(prediction.current_price, Some(dec!(1.0852)));
        assert_eq!(prediction.price_change_24h, Some(-0.12));
    }

    #[test]
    fn parses_epoch_millis_timestamps() {
        let json = r#"{
            "timestamp": 1722506400000,
            "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0
        }"#;

        let bar: RawBar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.timestamp.timestamp_millis(), 1_722_506_400_000);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        let json = r#"{
            "timestamp": "not-a-date",
            "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0
        }"#;

        assert!(serde_json::from_str::<RawBar>(json).is_err());
    }
}
