//! Response normalization
//!
//! Converts the backend's raw wire payloads into the single internal view
//! model, validating the pieces the query's market type requires. Validation
//! fails closed: a forex response without its prediction block is a schema
//! mismatch, not a silent default. An empty bar series is valid and means
//! "no data yet".

use chrono::{DateTime, Utc};
use livechart_client::{RawBar, RawPrediction, RawSeriesResponse};
use livechart_core::{
    Bar, BarSignal, FetchError, FetchResult, MarketQuery, MarketType, Prediction,
    PredictionDirection, SeriesPayload, Signal, Timeframe,
};

/// Normalize a raw backend payload for the query that produced it
pub fn normalize(raw: RawSeriesResponse, query: &MarketQuery) -> FetchResult<SeriesPayload> {
    let bars = normalize_bars(raw.data)?;

    let prediction = match query.market_type {
        MarketType::Forex => {
            let block = raw.prediction.ok_or_else(|| {
                FetchError::schema("forex response is missing the prediction block")
            })?;
            Some(normalize_prediction(block)?)
        }
        // Crypto responses never carry a prediction; drop one if it shows up.
        MarketType::Crypto => None,
    };

    let symbol = raw
        .symbol
        .or(raw.pair)
        .unwrap_or_else(|| query.symbol.clone());

    let timeframe = raw
        .timeframe
        .as_deref()
        .and_then(Timeframe::from_str)
        .unwrap_or(query.timeframe);

    Ok(SeriesPayload {
        symbol,
        timeframe,
        bars,
        prediction,
        technical_signal: raw.technical_signal.as_deref().and_then(parse_signal),
        latest_signal: raw.latest_signal.as_deref().and_then(parse_signal),
    })
}

/// Validate ordering and convert bars
///
/// Timestamps must be strictly ascending; a duplicate or regression means
/// the payload is unusable as a series.
fn normalize_bars(raw: Vec<RawBar>) -> FetchResult<Vec<Bar>> {
    let mut bars = Vec::with_capacity(raw.len());
    let mut previous: Option<DateTime<Utc>> = None;

    for bar in raw {
        if let Some(previous) = previous {
            if bar.timestamp <= previous {
                return Err(FetchError::schema(format!(
                    "bars out of order at {}",
                    bar.timestamp
                )));
            }
        }
        previous = Some(bar.timestamp);

        bars.push(Bar {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            sma_20: bar.sma_20,
            sma_50: bar.sma_50,
            signal: parse_bar_signal(bar.signal.as_deref()),
        });
    }

    Ok(bars)
}

fn normalize_prediction(raw: RawPrediction) -> FetchResult<Prediction> {
    let direction = raw
        .prediction
        .as_deref()
        .map(parse_direction)
        .ok_or_else(|| FetchError::schema("prediction block is missing its direction"))?;

    let confidence = raw
        .confidence
        .ok_or_else(|| FetchError::schema("prediction block is missing confidence"))?;
    if !(0.0..=100.0).contains(&confidence) {
        return Err(FetchError::schema(format!(
            "confidence {confidence} outside [0, 100]"
        )));
    }

    let current_price = raw
        .current_price
        .ok_or_else(|| FetchError::schema("prediction block is missing current_price"))?;

    let price_change_24h = raw
        .price_change_24h
        .ok_or_else(|| FetchError::schema("prediction block is missing price_change_24h"))?;

    Ok(Prediction {
        direction,
        confidence,
        signal_strength: raw.signal_strength.unwrap_or_default(),
        current_price,
        price_change_24h,
        message: raw.message.unwrap_or_default(),
    })
}

/// Per-bar signals: only BUY/SELL mark a bar; HOLD and anything else do not
fn parse_bar_signal(raw: Option<&str>) -> Option<BarSignal> {
    match raw {
        Some("BUY") => Some(BarSignal::Buy),
        Some("SELL") => Some(BarSignal::Sell),
        _ => None,
    }
}

/// Summary signals: unrecognized values are treated as absent
fn parse_signal(raw: &str) -> Option<Signal> {
    match raw {
        "BUY" => Some(Signal::Buy),
        "SELL" => Some(Signal::Sell),
        "WAIT" => Some(Signal::Wait),
        _ => None,
    }
}

/// UP/DOWN map directly; FLAT, the predictor's insufficient-data WAIT, and
/// anything unrecognized read as no usable direction
fn parse_direction(raw: &str) -> PredictionDirection {
    match raw {
        "UP" => PredictionDirection::Up,
        "DOWN" => PredictionDirection::Down,
        _ => PredictionDirection::Flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn crypto_query() -> MarketQuery {
        MarketQuery::default_crypto()
    }

    fn forex_query() -> MarketQuery {
        MarketQuery::new(
            MarketType::Forex,
            "EUR/USD",
            livechart_core::Timeframe::OneHour,
        )
        .unwrap()
    }

    fn raw_bar(offset_secs: i64, signal: Option<&str>) -> RawBar {
        let signal = match signal {
            Some(s) => format!(r#", "Signal": "{s}""#),
            None => String::new(),
        };
        let json = format!(
            r#"{{"timestamp": {}, "open": 100.0, "high": 101.0, "low": 99.0, "close": 100.5{signal}}}"#,
            1_722_506_400_000 + offset_secs * 1000
        );
        serde_json::from_str(&json).unwrap()
    }

    fn raw_prediction() -> RawPrediction {
        RawPrediction {
            prediction: Some("DOWN".to_string()),
            confidence: Some(72.5),
            signal_strength: Some("STRONG".to_string()),
            current_price: Some(dec!(1.0852)),
            price_change_24h: Some(-0.3),
            message: Some("STRONG DOWN signal with 72.5% confidence".to_string()),
        }
    }

    fn empty_response() -> RawSeriesResponse {
        RawSeriesResponse {
            symbol: None,
            pair: None,
            timeframe: None,
            data: vec![],
            prediction: None,
            latest_signal: None,
            technical_signal: None,
        }
    }

    #[test]
    fn empty_data_is_valid_awaiting_state() {
        let payload = normalize(empty_response(), &crypto_query()).unwrap();

        assert!(payload.bars.is_empty());
        assert_eq!(payload.symbol, "BTC/USDT");
        assert_eq!(payload.latest_close(), None);
    }

    #[test]
    fn forex_without_prediction_is_schema_mismatch() {
        let err = normalize(empty_response(), &forex_query()).unwrap_err();
        assert!(matches!(err, FetchError::Schema(_)));
    }

    #[test]
    fn crypto_ignores_unexpected_prediction() {
        let raw = RawSeriesResponse {
            prediction: Some(raw_prediction()),
            data: vec![raw_bar(0, None)],
            ..empty_response()
        };

        let payload = normalize(raw, &crypto_query()).unwrap();
        assert!(payload.prediction.is_none());
    }

    #[test]
    fn out_of_order_bars_are_rejected() {
        let raw = RawSeriesResponse {
            data: vec![raw_bar(3600, None), raw_bar(0, None)],
            ..empty_response()
        };

        let err = normalize(raw, &crypto_query()).unwrap_err();
        assert!(matches!(err, FetchError::Schema(_)));
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let raw = RawSeriesResponse {
            data: vec![raw_bar(0, None), raw_bar(0, None)],
            ..empty_response()
        };

        assert!(normalize(raw, &crypto_query()).is_err());
    }

    #[test]
    fn hold_and_unknown_bar_signals_normalize_to_none() {
        let raw = RawSeriesResponse {
            data: vec![
                raw_bar(0, Some("HOLD")),
                raw_bar(3600, Some("BUY")),
                raw_bar(7200, Some("bogus")),
                raw_bar(10800, Some("SELL")),
            ],
            ..empty_response()
        };

        let payload = normalize(raw, &crypto_query()).unwrap();
        let signals: Vec<_> = payload.bars.iter().map(|b| b.signal).collect();
        assert_eq!(
            signals,
            vec![None, Some(BarSignal::Buy), None, Some(BarSignal::Sell)]
        );
    }

    #[test]
    fn confidence_outside_range_is_schema_mismatch() {
        let mut prediction = raw_prediction();
        prediction.confidence = Some(104.0);
        let raw = RawSeriesResponse {
            prediction: Some(prediction),
            ..empty_response()
        };

        assert!(normalize(raw, &forex_query()).is_err());
    }

    #[test]
    fn forex_payload_carries_prediction_and_signals() {
        let raw = RawSeriesResponse {
            pair: Some("EUR/USD".to_string()),
            timeframe: Some("4h".to_string()),
            data: vec![raw_bar(0, None)],
            prediction: Some(raw_prediction()),
            technical_signal: Some("SELL".to_string()),
            ..empty_response()
        };

        let payload = normalize(raw, &forex_query()).unwrap();

        let prediction = payload.prediction.unwrap();
        assert_eq!(prediction.direction, PredictionDirection::Down);
        assert_eq!(prediction.confidence, 72.5);
        assert_eq!(payload.technical_signal, Some(Signal::Sell));
        assert_eq!(payload.timeframe, livechart_core::Timeframe::FourHours);
    }

    #[test]
    fn insufficient_data_direction_reads_as_flat() {
        let mut prediction = raw_prediction();
        prediction.prediction = Some("WAIT".to_string());
        let raw = RawSeriesResponse {
            prediction: Some(prediction),
            ..empty_response()
        };

        let payload = normalize(raw, &forex_query()).unwrap();
        assert_eq!(
            payload.prediction.unwrap().direction,
            PredictionDirection::Flat
        );
    }
}
