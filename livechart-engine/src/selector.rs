//! Market query selection
//!
//! Owns the live (market type, symbol, timeframe) selection. The scheduler
//! subscribes to the watch channel; publishing a changed query IS the
//! "query changed" signal, there are no other side effects.

use livechart_core::{InvalidSymbol, MarketQuery, QueryPatch};
use tokio::sync::watch;
use tracing::debug;

/// Holds the current market query and validates selection changes
#[derive(Debug)]
pub struct MarketQuerySelector {
    tx: watch::Sender<MarketQuery>,
}

impl MarketQuerySelector {
    /// Create a selector starting at `initial`
    pub fn new(initial: MarketQuery) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Snapshot of the current query
    pub fn current(&self) -> MarketQuery {
        self.tx.borrow().clone()
    }

    /// Subscribe to query changes
    pub fn subscribe(&self) -> watch::Receiver<MarketQuery> {
        self.tx.subscribe()
    }

    /// Merge a partial selection change
    ///
    /// Validation happens in [`MarketQuery::apply`]: a market-type change
    /// without a matching symbol lands on the new type's default, and symbols
    /// outside the effective type's domain are rejected. Subscribers are only
    /// notified when the query actually changed.
    pub fn select(&self, patch: QueryPatch) -> Result<MarketQuery, InvalidSymbol> {
        let next = self.current().apply(patch)?;

        let modified = self.tx.send_if_modified(|query| {
            if *query == next {
                false
            } else {
                *query = next.clone();
                true
            }
        });

        if modified {
            debug!("Query changed to {}", next);
        }

        Ok(next)
    }
}

impl Default for MarketQuerySelector {
    fn default() -> Self {
        Self::new(MarketQuery::default_crypto())
    }
}
