use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Buy,
    Sell,
}

/// One row of a level-3 order book snapshot. Price and size stay as the
/// decimal strings the backend sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel3Entry {
    pub price: String,
    pub size: String,
    pub side: BookSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl OrderBookLevel3Entry {
    pub fn new(price: &str, size: &str, side: BookSide) -> Self {
        Self {
            price: price.to_string(),
            size: size.to_string(),
            side,
            id: None,
        }
    }

    pub fn price_f64(&self) -> f64 {
        self.price.trim().parse::<f64>().unwrap_or(0.0)
    }

    pub fn size_f64(&self) -> f64 {
        self.size.trim().parse::<f64>().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookLevel3 {
    pub symbol: String,
    /// Best bid first.
    pub bids: Vec<OrderBookLevel3Entry>,
    /// Best ask first.
    pub asks: Vec<OrderBookLevel3Entry>,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<u64>,
}

impl OrderBookLevel3 {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeData {
    pub timestamp: i64,
    pub volume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover: Option<String>,
}

impl VolumeData {
    pub fn volume_f64(&self) -> f64 {
        self.volume.trim().parse::<f64>().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongShortRatioData {
    pub symbol: String,
    pub buy_ratio: String,
    pub sell_ratio: String,
    pub timestamp: i64,
}

impl LongShortRatioData {
    pub fn buy_ratio_f64(&self) -> f64 {
        self.buy_ratio.trim().parse::<f64>().unwrap_or(0.0)
    }

    pub fn sell_ratio_f64(&self) -> f64 {
        self.sell_ratio.trim().parse::<f64>().unwrap_or(0.0)
    }
}

/// Envelope wrapping every backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orderbook_deserialize() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "bids": [{"price": "64000.5", "size": "1.25", "side": "buy", "id": "b1"}],
            "asks": [{"price": "64001.0", "size": "0.5", "side": "sell"}],
            "timestamp": 1718000000000,
            "updateId": 42
        }"#;

        let book: OrderBookLevel3 = serde_json::from_str(json).unwrap();
        assert_eq!(book.symbol, "BTCUSDT");
        assert_eq!(book.update_id, Some(42));
        assert_eq!(book.bids[0].side, BookSide::Buy);
        assert_eq!(book.bids[0].id.as_deref(), Some("b1"));
        assert_eq!(book.asks[0].id, None);
        assert_eq!(book.bids[0].price_f64(), 64000.5);
        assert!(!book.is_empty());
    }

    #[test]
    fn test_unparseable_decimal_is_zero() {
        let entry = OrderBookLevel3Entry::new("abc", "", BookSide::Sell);
        assert_eq!(entry.price_f64(), 0.0);
        assert_eq!(entry.size_f64(), 0.0);
    }

    #[test]
    fn test_envelope_failure() {
        let json = r#"{"success": false, "message": "symbol not supported"}"#;
        let resp: ApiResponse<Vec<VolumeData>> = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.message.as_deref(), Some("symbol not supported"));
    }

    #[test]
    fn test_long_short_deserialize() {
        let json = r#"{"data": [{"symbol": "ETHUSDT", "buyRatio": "0.62", "sellRatio": "0.38", "timestamp": 1}]}"#;
        let resp: ApiResponse<Vec<LongShortRatioData>> = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        let series = resp.data.unwrap();
        assert_eq!(series[0].buy_ratio_f64(), 0.62);
        assert_eq!(series[0].sell_ratio_f64(), 0.38);
    }
}
