//! Livechart dashboard runner
//!
//! Wires the analysis client, selector, and refresh scheduler together and
//! renders each reconciled view as structured log output. The chart surface
//! here is a logging sink; a real widget plugs in behind the same trait.

use std::sync::Arc;

use livechart_client::AnalysisClient;
use livechart_core::{MarketQuery, MarketType, Timeframe};
use livechart_engine::{ChartSeries, ChartSurface, Dashboard, SchedulerConfig, ViewState};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Chart sink that reports what would be drawn
struct TracingSurface;

impl ChartSurface for TracingSurface {
    fn draw(&mut self, series: &ChartSeries, title: &str) {
        info!(
            "Drawing {}: {} candles, {} SMA20 points, {} SMA50 points, {} buy / {} sell markers",
            title,
            series.candles.len(),
            series.sma_20.len(),
            series.sma_50.len(),
            series.buy_markers.len(),
            series.sell_markers.len()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,livechart_app=debug")),
        )
        .init();

    let client = AnalysisClient::from_env();
    info!("Starting Livechart against {}", client.base_url());

    // Reachability probe only; a down backend still starts the dashboard.
    match client.health_check().await {
        Ok(()) => info!("Analysis backend is reachable"),
        Err(e) => warn!("Analysis backend health check failed: {}", e),
    }

    let initial = query_from_env()?;
    let mut dashboard = Dashboard::start_with(
        Arc::new(client),
        TracingSurface,
        initial,
        SchedulerConfig::default(),
    );
    info!("Dashboard started on {}", dashboard.query());

    loop {
        tokio::select! {
            view = dashboard.next_view() => {
                match view {
                    Some(view) => report(&view),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    dashboard.stop();
    Ok(())
}

/// Build the startup query from LIVECHART_MARKET / LIVECHART_SYMBOL /
/// LIVECHART_TIMEFRAME, falling back to the default crypto selection
fn query_from_env() -> anyhow::Result<MarketQuery> {
    let market_type = match std::env::var("LIVECHART_MARKET").ok().as_deref() {
        Some("forex") => MarketType::Forex,
        Some("crypto") | None => MarketType::Crypto,
        Some(other) => {
            warn!("Unknown LIVECHART_MARKET '{}', using crypto", other);
            MarketType::Crypto
        }
    };

    let timeframe = std::env::var("LIVECHART_TIMEFRAME")
        .ok()
        .and_then(|s| Timeframe::from_str(&s))
        .unwrap_or_default();

    let symbol = std::env::var("LIVECHART_SYMBOL")
        .unwrap_or_else(|_| market_type.default_symbol().to_string());

    Ok(MarketQuery::new(market_type, symbol, timeframe)?)
}

fn report(view: &ViewState) {
    match view {
        ViewState::Loading => info!("Loading market data..."),
        ViewState::Failed { error } => warn!("Error loading data: {}", error),
        ViewState::Active {
            cards,
            chart,
            notice,
        } => {
            if let Some(notice) = notice {
                warn!("Refresh failed, showing last good data: {}", notice);
            }
            if chart.is_none() {
                info!("{}: no data available", cards.stats.symbol);
            }
            let price = cards
                .latest_price
                .map(|p| format!("${:.2}", p))
                .unwrap_or_else(|| "-".to_string());
            info!(
                "{} [{}] {} points, signal {}, latest {}",
                cards.stats.symbol,
                cards.stats.timeframe,
                cards.stats.data_points,
                cards.badge.as_str(),
                price
            );
            if let Some(prediction) = &cards.prediction {
                info!(
                    "ML prediction: {} ({} confidence {:.1}%, {}) at {}, {} 24h - {}",
                    prediction.direction.as_str(),
                    prediction.tier.as_str(),
                    prediction.confidence,
                    prediction.signal_strength,
                    prediction.current_price,
                    prediction.change_24h,
                    prediction.message
                );
            }
        }
    }
}
