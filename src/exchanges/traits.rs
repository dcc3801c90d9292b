use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Bybit,
    Binance,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Bybit => "bybit",
            Exchange::Binance => "binance",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tradable instrument, normalised across exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub exchange: Exchange,
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub status: String,
    pub tick_size: Option<f64>,
    pub qty_step: Option<f64>,
    pub min_qty: Option<f64>,
}

impl Instrument {
    pub fn is_trading(&self) -> bool {
        self.status.eq_ignore_ascii_case("trading")
    }
}

#[async_trait]
pub trait InstrumentSource: Send + Sync {
    fn exchange(&self) -> Exchange;

    async fn fetch_instruments(&self) -> Result<Vec<Instrument>>;
}

pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
