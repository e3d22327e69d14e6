//! Market query types
//!
//! A `MarketQuery` is the immutable (market type, symbol, timeframe) triple
//! the dashboard is currently showing. Selection changes always produce a new
//! value; nothing mutates a query in place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Crypto symbols offered by the dashboard, first entry is the default
pub const CRYPTO_SYMBOLS: &[&str] = &["BTC/USDT", "ETH/USDT", "SOL/USDT"];

/// Forex pairs offered by the dashboard, first entry is the default
pub const FOREX_PAIRS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "AUD/USD", "USD/CAD", "USD/CHF",
];

/// Which market family a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Crypto spot pairs quoted against USDT
    Crypto,
    /// Forex currency pairs
    Forex,
}

impl MarketType {
    /// Symbols valid for this market type
    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            MarketType::Crypto => CRYPTO_SYMBOLS,
            MarketType::Forex => FOREX_PAIRS,
        }
    }

    /// Default symbol for this market type
    pub fn default_symbol(&self) -> &'static str {
        self.symbols()[0]
    }

    /// Whether `symbol` belongs to this type's option domain
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols().contains(&symbol)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MarketType::Crypto => "Crypto",
            MarketType::Forex => "Forex",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Candle timeframe for the series request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 15 minute candles
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 1 hour candles
    #[serde(rename = "1h")]
    OneHour,
    /// 4 hour candles
    #[serde(rename = "4h")]
    FourHours,
}

impl Timeframe {
    /// Wire representation used in backend query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::FifteenMinutes => "15m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
        }
    }

    /// Uppercase label for display cards
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::FifteenMinutes => "15M",
            Timeframe::OneHour => "1H",
            Timeframe::FourHours => "4H",
        }
    }

    /// Parse from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "15m" => Some(Timeframe::FifteenMinutes),
            "1h" => Some(Timeframe::OneHour),
            "4h" => Some(Timeframe::FourHours),
            _ => None,
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::OneHour
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The (market type, symbol, timeframe) selection driving all fetches
///
/// Invariant: `symbol` is a member of `market_type`'s option domain. Construct
/// through [`MarketQuery::new`] or [`MarketQuery::apply`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketQuery {
    pub market_type: MarketType,
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl MarketQuery {
    /// Build a query, rejecting symbols outside the market type's domain
    pub fn new(
        market_type: MarketType,
        symbol: impl Into<String>,
        timeframe: Timeframe,
    ) -> Result<Self, InvalidSymbol> {
        let symbol = symbol.into();
        if !market_type.contains(&symbol) {
            return Err(InvalidSymbol {
                market_type,
                symbol,
            });
        }
        Ok(Self {
            market_type,
            symbol,
            timeframe,
        })
    }

    /// The default crypto query shown on startup
    pub fn default_crypto() -> Self {
        Self {
            market_type: MarketType::Crypto,
            symbol: MarketType::Crypto.default_symbol().to_string(),
            timeframe: Timeframe::default(),
        }
    }

    /// Merge a partial selection change into a new query
    ///
    /// When the market type changes without an explicit symbol valid for the
    /// new type, the symbol resets to that type's default instead of carrying
    /// over a cross-type value. An explicit symbol outside the effective
    /// type's domain is rejected.
    pub fn apply(&self, patch: QueryPatch) -> Result<Self, InvalidSymbol> {
        let market_type = patch.market_type.unwrap_or(self.market_type);

        let symbol = match patch.symbol {
            Some(symbol) => {
                if !market_type.contains(&symbol) {
                    return Err(InvalidSymbol {
                        market_type,
                        symbol,
                    });
                }
                symbol
            }
            None if market_type != self.market_type => {
                market_type.default_symbol().to_string()
            }
            None => self.symbol.clone(),
        };

        Ok(Self {
            market_type,
            symbol,
            timeframe: patch.timeframe.unwrap_or(self.timeframe),
        })
    }
}

impl fmt::Display for MarketQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.market_type, self.symbol, self.timeframe)
    }
}

/// Partial selection change merged by [`MarketQuery::apply`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub market_type: Option<MarketType>,
    pub symbol: Option<String>,
    pub timeframe: Option<Timeframe>,
}

impl QueryPatch {
    pub fn market_type(market_type: MarketType) -> Self {
        Self {
            market_type: Some(market_type),
            ..Self::default()
        }
    }

    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    pub fn timeframe(timeframe: Timeframe) -> Self {
        Self {
            timeframe: Some(timeframe),
            ..Self::default()
        }
    }
}

/// Rejected selection: the symbol is not in the market type's domain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Symbol {symbol} is not a valid {market_type} selection")]
pub struct InvalidSymbol {
    pub market_type: MarketType,
    pub symbol: String,
}
