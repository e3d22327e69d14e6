//! Analysis backend API client
//!
//! Provides methods for the two series endpoints the dashboard polls, plus
//! the backend's health probe. Transport failures are mapped onto the
//! dashboard's fetch-error taxonomy here so callers never see reqwest errors.

use crate::types::RawSeriesResponse;
use livechart_core::{FetchError, FetchResult, MarketQuery, MarketType, Timeframe};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default base URL for the analysis backend
pub const DEFAULT_API_BASE: &str = "http://localhost:8001/api";

/// Environment variable overriding the backend base URL
pub const API_BASE_ENV: &str = "LIVECHART_API_URL";

/// Exchange the backend falls back to for crypto OHLC
const DEFAULT_EXCHANGE: &str = "binance";

/// History window requested for forex pairs
const DEFAULT_FOREX_PERIOD: &str = "1mo";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Analysis backend client
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a client against the given API base (e.g. `http://host:8001/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from `LIVECHART_API_URL`, falling back to the default base
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(base_url)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the series payload for a market query
    ///
    /// Dispatches to the crypto or forex endpoint based on the query's
    /// market type.
    pub async fn fetch_series(&self, query: &MarketQuery) -> FetchResult<RawSeriesResponse> {
        match query.market_type {
            MarketType::Crypto => {
                self.market_analysis(&query.symbol, query.timeframe, None)
                    .await
            }
            MarketType::Forex => {
                self.forex_prediction(&query.symbol, query.timeframe, None)
                    .await
            }
        }
    }

    /// GET /market-analysis/ for a crypto symbol
    #[instrument(skip(self))]
    pub async fn market_analysis(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        exchange: Option<&str>,
    ) -> FetchResult<RawSeriesResponse> {
        let mut url = format!(
            "{}/market-analysis/?symbol={}&timeframe={}",
            self.base_url,
            symbol,
            timeframe.as_str()
        );

        let exchange = exchange.unwrap_or(DEFAULT_EXCHANGE);
        if exchange != DEFAULT_EXCHANGE {
            url.push_str(&format!("&exchange={}", exchange));
        }

        self.get_series(&url).await
    }

    /// GET /forex-prediction/ for a forex pair
    #[instrument(skip(self))]
    pub async fn forex_prediction(
        &self,
        pair: &str,
        timeframe: Timeframe,
        period: Option<&str>,
    ) -> FetchResult<RawSeriesResponse> {
        let url = format!(
            "{}/forex-prediction/?pair={}&timeframe={}&period={}",
            self.base_url,
            pair,
            timeframe.as_str(),
            period.unwrap_or(DEFAULT_FOREX_PERIOD)
        );

        self.get_series(&url).await
    }

    /// GET /health/ - reachability probe, no payload of interest
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> FetchResult<()> {
        let url = format!("{}/health/", self.base_url);

        let response = self.client.get(&url).send().await.map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(FetchError::server(response.status().as_u16()));
        }

        Ok(())
    }

    async fn get_series(&self, url: &str) -> FetchResult<RawSeriesResponse> {
        debug!("Fetching series from: {}", url);

        let response = self.client.get(url).send().await.map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(FetchError::server(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::schema(format!("Failed to decode series response: {}", e)))
    }
}

/// Map a reqwest transport failure onto the fetch taxonomy
fn map_transport(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::network(format!("Failed to reach backend: {}", error))
    }
}
