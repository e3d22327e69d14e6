//! Fetch lifecycle state
//!
//! Exactly one `FetchState` is current at any time. Each non-idle variant
//! owns the query it was issued for, which is what lets the scheduler detect
//! stale responses by equality against the live selection.

use crate::error::FetchError;
use crate::query::MarketQuery;
use crate::series::SeriesPayload;
use serde::{Deserialize, Serialize};

/// Lifecycle of the current fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchState {
    /// Nothing requested yet
    Idle,
    /// A request for `query` is in flight
    Loading { query: MarketQuery },
    /// The latest applied result for `query`
    Loaded {
        query: MarketQuery,
        payload: SeriesPayload,
    },
    /// The request for `query` ended in a terminal error
    Failed {
        query: MarketQuery,
        error: FetchError,
    },
}

impl FetchState {
    /// The query this state was issued for, if any
    pub fn query(&self) -> Option<&MarketQuery> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { query }
            | FetchState::Loaded { query, .. }
            | FetchState::Failed { query, .. } => Some(query),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    /// Payload of the applied result, if this state carries one
    pub fn payload(&self) -> Option<&SeriesPayload> {
        match self {
            FetchState::Loaded { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Error of a failed fetch, if this state carries one
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl Default for FetchState {
    fn default() -> Self {
        FetchState::Idle
    }
}
