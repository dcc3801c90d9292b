use serde::Deserialize;

use crate::exchanges::traits::parse_decimal;
use crate::exchanges::{Exchange, Instrument};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub server_time: Option<u64>,
    pub symbols: Vec<BinanceSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbol {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    PriceFilter { tick_size: String },
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize { step_size: String, min_qty: String },
    #[serde(other)]
    Other,
}

impl BinanceSymbol {
    pub fn to_instrument(&self) -> Instrument {
        let mut tick_size = None;
        let mut qty_step = None;
        let mut min_qty = None;

        for filter in &self.filters {
            match filter {
                SymbolFilter::PriceFilter { tick_size: t } => tick_size = parse_decimal(t),
                SymbolFilter::LotSize { step_size, min_qty: m } => {
                    qty_step = parse_decimal(step_size);
                    min_qty = parse_decimal(m);
                }
                SymbolFilter::Other => {}
            }
        }

        Instrument {
            exchange: Exchange::Binance,
            symbol: self.symbol.clone(),
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            status: self.status.clone(),
            tick_size,
            qty_step,
            min_qty,
        }
    }
}
