use serde::Deserialize;

use crate::exchanges::traits::parse_decimal;
use crate::exchanges::{Exchange, Instrument};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    pub ret_code: i64,
    pub ret_msg: String,
    pub result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentsInfo {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub list: Vec<BybitInstrument>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitInstrument {
    pub symbol: String,
    pub status: String,
    pub base_coin: String,
    pub quote_coin: String,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub price_filter: Option<PriceFilter>,
    #[serde(default)]
    pub lot_size_filter: Option<LotSizeFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    pub tick_size: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    #[serde(default)]
    pub qty_step: Option<String>,
    #[serde(default)]
    pub base_precision: Option<String>,
    pub min_order_qty: String,
}

impl BybitInstrument {
    pub fn to_instrument(&self) -> Instrument {
        let lot = self.lot_size_filter.as_ref();

        Instrument {
            exchange: Exchange::Bybit,
            symbol: self.symbol.clone(),
            base_asset: self.base_coin.clone(),
            quote_asset: self.quote_coin.clone(),
            status: self.status.clone(),
            tick_size: self
                .price_filter
                .as_ref()
                .and_then(|f| parse_decimal(&f.tick_size)),
            // Spot instruments report basePrecision instead of qtyStep.
            qty_step: lot
                .and_then(|l| l.qty_step.as_deref().or(l.base_precision.as_deref()))
                .and_then(parse_decimal),
            min_qty: lot.and_then(|l| parse_decimal(&l.min_order_qty)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_instruments_page() {
        let json = r#"{
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "category": "linear",
                "list": [{
                    "symbol": "BTCUSDT",
                    "contractType": "LinearPerpetual",
                    "status": "Trading",
                    "baseCoin": "BTC",
                    "quoteCoin": "USDT",
                    "priceFilter": {"minPrice": "0.10", "maxPrice": "1999999.80", "tickSize": "0.10"},
                    "lotSizeFilter": {"maxOrderQty": "1190.000", "minOrderQty": "0.001", "qtyStep": "0.001"}
                }],
                "nextPageCursor": "first%3DBTCUSDT"
            },
            "time": 1718000000000
        }"#;

        let resp: BybitResponse<InstrumentsInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.ret_code, 0);

        let info = resp.result.unwrap();
        assert_eq!(info.next_page_cursor.as_deref(), Some("first%3DBTCUSDT"));

        let instrument = info.list[0].to_instrument();
        assert_eq!(instrument.exchange, Exchange::Bybit);
        assert_eq!(instrument.base_asset, "BTC");
        assert_eq!(instrument.tick_size, Some(0.1));
        assert_eq!(instrument.qty_step, Some(0.001));
        assert_eq!(instrument.min_qty, Some(0.001));
        assert!(instrument.is_trading());
    }

    #[test]
    fn test_spot_uses_base_precision() {
        let json = r#"{
            "symbol": "ETHUSDT",
            "status": "Trading",
            "baseCoin": "ETH",
            "quoteCoin": "USDT",
            "lotSizeFilter": {"basePrecision": "0.00001", "minOrderQty": "0.0001"}
        }"#;

        let instrument = serde_json::from_str::<BybitInstrument>(json).unwrap().to_instrument();
        assert_eq!(instrument.qty_step, Some(0.00001));
        assert_eq!(instrument.tick_size, None);
    }

    #[test]
    fn test_error_response() {
        let json = r#"{"retCode": 10001, "retMsg": "params error", "result": {}, "time": 1}"#;
        let resp: BybitResponse<InstrumentsInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.ret_code, 10001);
        let info = resp.result.unwrap();
        assert!(info.list.is_empty());
        assert!(info.next_page_cursor.is_none());
    }
}
