//! Coin and API identification types.
//!
//! Mercado Bitcoin exposes one public REST tree per coin, with one
//! sub-resource per API (`day-summary`, `trades`, ...).

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One unit of market data as returned by the API.
///
/// Kept as a raw JSON object: the ingestor persists what it receives.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Coin symbol (e.g., "BTC", "ETH").
///
/// Case is preserved exactly as given; the only rule is that the symbol
/// must not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coin(String);

impl Coin {
    pub fn new(symbol: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(CoreError::InvalidCoin(symbol));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Coin {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Coin> for String {
    fn from(coin: Coin) -> Self {
        coin.0
    }
}

impl FromStr for Coin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Public API resource.
///
/// The wire name doubles as the URL path segment and as the API identifier
/// in persisted file names and object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiKind {
    /// Aggregated daily statistics for one coin.
    DaySummary,
    /// Raw trades, optionally bounded by a time range.
    Trades,
}

impl ApiKind {
    pub const ALL: [ApiKind; 2] = [ApiKind::DaySummary, ApiKind::Trades];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::DaySummary => "day-summary",
            ApiKind::Trades => "trades",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        ApiKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownApi(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_preserves_case() {
        let coin = Coin::new("btc").unwrap();
        assert_eq!(coin.as_str(), "btc");
        assert_eq!(Coin::new("BTC").unwrap().to_string(), "BTC");
    }

    #[test]
    fn test_coin_rejects_blank() {
        assert_eq!(Coin::new(""), Err(CoreError::InvalidCoin(String::new())));
        assert!(Coin::new("   ").is_err());
    }

    #[test]
    fn test_coin_deserialize_validates() {
        let coins: Vec<Coin> = serde_json::from_str(r#"["BTC","ETH"]"#).unwrap();
        assert_eq!(coins.len(), 2);
        assert!(serde_json::from_str::<Coin>(r#""""#).is_err());
    }

    #[test]
    fn test_api_kind_wire_names() {
        assert_eq!(ApiKind::DaySummary.as_str(), "day-summary");
        assert_eq!(ApiKind::Trades.to_string(), "trades");
        assert_eq!("trades".parse::<ApiKind>().unwrap(), ApiKind::Trades);
        assert!("orderbook".parse::<ApiKind>().is_err());

        let json = serde_json::to_string(&ApiKind::DaySummary).unwrap();
        assert_eq!(json, r#""day-summary""#);
    }
}
