use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::analytics::{DepthAnalysis, LongShortAnalysis, VolumeAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    OrderBook,
    Volume,
    LongShort,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::OrderBook => "orderbook",
            Feed::Volume => "volume",
            Feed::LongShort => "long_short",
        }
    }
}

/// Latest derived analytics for one symbol. Each part is replaced
/// wholesale when its feed delivers a new snapshot.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub depth: Option<DepthAnalysis>,
    pub volume: Option<VolumeAnalysis>,
    pub long_short: Option<LongShortAnalysis>,
    pub orderbook_error: Option<String>,
    pub volume_error: Option<String>,
    pub long_short_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketSummary {
    pub fn error(&self, feed: Feed) -> Option<&str> {
        match feed {
            Feed::OrderBook => self.orderbook_error.as_deref(),
            Feed::Volume => self.volume_error.as_deref(),
            Feed::LongShort => self.long_short_error.as_deref(),
        }
    }

    /// True while some feed is showing data from before its latest failure.
    pub fn is_stale(&self) -> bool {
        (self.depth.is_some() && self.orderbook_error.is_some())
            || (self.volume.is_some() && self.volume_error.is_some())
            || (self.long_short.is_some() && self.long_short_error.is_some())
    }
}

pub struct MarketBoard {
    pub summaries: DashMap<String, MarketSummary>,
}

impl MarketBoard {
    pub fn new() -> Self {
        Self {
            summaries: DashMap::new(),
        }
    }

    pub fn update_depth(&self, symbol: &str, depth: DepthAnalysis) {
        let mut entry = self.summaries.entry(symbol.to_string()).or_default();
        entry.depth = Some(depth);
        entry.orderbook_error = None;
        entry.updated_at = Some(Utc::now());
    }

    pub fn update_volume(&self, symbol: &str, volume: Option<VolumeAnalysis>) {
        let mut entry = self.summaries.entry(symbol.to_string()).or_default();
        entry.volume = volume;
        entry.volume_error = None;
        entry.updated_at = Some(Utc::now());
    }

    pub fn update_long_short(&self, symbol: &str, long_short: Option<LongShortAnalysis>) {
        let mut entry = self.summaries.entry(symbol.to_string()).or_default();
        entry.long_short = long_short;
        entry.long_short_error = None;
        entry.updated_at = Some(Utc::now());
    }

    /// Record a feed failure; previously derived data is left in place.
    pub fn record_error(&self, symbol: &str, feed: Feed, error: String) {
        debug!("{} {} feed error recorded: {}", symbol, feed.as_str(), error);
        let mut entry = self.summaries.entry(symbol.to_string()).or_default();
        match feed {
            Feed::OrderBook => entry.orderbook_error = Some(error),
            Feed::Volume => entry.volume_error = Some(error),
            Feed::LongShort => entry.long_short_error = Some(error),
        }
    }

    pub fn get_summary(&self, symbol: &str) -> Option<MarketSummary> {
        self.summaries.get(symbol).map(|entry| entry.value().clone())
    }

    pub fn get_mid_price(&self, symbol: &str) -> Option<f64> {
        self.summaries
            .get(symbol)?
            .depth
            .as_ref()?
            .vwap
            .map(|v| v.mid_price)
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.summaries.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }
}

impl Default for MarketBoard {
    fn default() -> Self {
        Self::new()
    }
}
