//! Cumulative depth, ladder and VWAP summary for a level-3 book snapshot.
//!
//! Everything here is recomputed from scratch on each snapshot. An empty
//! side short-circuits to an empty [`DepthAnalysis`] with no VWAP.

use serde::Serialize;

use crate::market::{BookSide, OrderBookLevel3, OrderBookLevel3Entry};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthChartData {
    pub price: f64,
    pub cumulative_volume: f64,
    pub side: BookSide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderEntry {
    pub price: f64,
    pub size: f64,
    pub side: BookSide,
    pub volume_percentage: f64,
    pub cumulative_volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VwapData {
    pub bid_vwap: f64,
    pub ask_vwap: f64,
    pub mid_price: f64,
    pub spread: f64,
    pub spread_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthAnalysis {
    pub bid_depth: Vec<DepthChartData>,
    pub ask_depth: Vec<DepthChartData>,
    pub bid_ladder: Vec<LadderEntry>,
    pub ask_ladder: Vec<LadderEntry>,
    pub vwap: Option<VwapData>,
    pub max_volume: f64,
    pub max_cumulative_volume: f64,
}

impl DepthAnalysis {
    pub fn is_empty(&self) -> bool {
        self.vwap.is_none()
    }

    pub fn total_bid_volume(&self) -> f64 {
        self.bid_depth.last().map(|d| d.cumulative_volume).unwrap_or(0.0)
    }

    pub fn total_ask_volume(&self) -> f64 {
        self.ask_depth.last().map(|d| d.cumulative_volume).unwrap_or(0.0)
    }
}

pub fn analyze_depth(book: &OrderBookLevel3, max_entries: usize) -> DepthAnalysis {
    let bids = &book.bids[..book.bids.len().min(max_entries)];
    let asks = &book.asks[..book.asks.len().min(max_entries)];

    if bids.is_empty() || asks.is_empty() {
        return DepthAnalysis::default();
    }

    let bid_depth = cumulative_depth(bids, BookSide::Buy);
    let ask_depth = cumulative_depth(asks, BookSide::Sell);

    let max_volume = bids
        .iter()
        .chain(asks)
        .map(OrderBookLevel3Entry::size_f64)
        .fold(0.0_f64, f64::max);

    let max_cumulative_volume = bid_depth
        .last()
        .map(|d| d.cumulative_volume)
        .unwrap_or(0.0)
        .max(ask_depth.last().map(|d| d.cumulative_volume).unwrap_or(0.0));

    let bid_ladder = ladder(bids, &bid_depth, max_volume);
    let ask_ladder = ladder(asks, &ask_depth, max_volume);

    let vwap = Some(vwap_summary(bids, asks));

    DepthAnalysis {
        bid_depth,
        ask_depth,
        bid_ladder,
        ask_ladder,
        vwap,
        max_volume,
        max_cumulative_volume,
    }
}

fn cumulative_depth(entries: &[OrderBookLevel3Entry], side: BookSide) -> Vec<DepthChartData> {
    let mut running = 0.0;
    entries
        .iter()
        .map(|entry| {
            running += entry.size_f64();
            DepthChartData {
                price: entry.price_f64(),
                cumulative_volume: running,
                side,
            }
        })
        .collect()
}

fn ladder(
    entries: &[OrderBookLevel3Entry],
    depth: &[DepthChartData],
    max_volume: f64,
) -> Vec<LadderEntry> {
    entries
        .iter()
        .zip(depth)
        .map(|(entry, point)| {
            let size = entry.size_f64();
            // All-zero books would otherwise produce NaN.
            let volume_percentage = if max_volume > 0.0 {
                size / max_volume * 100.0
            } else {
                0.0
            };

            LadderEntry {
                price: point.price,
                size,
                side: entry.side,
                volume_percentage,
                cumulative_volume: point.cumulative_volume,
            }
        })
        .collect()
}

/// `Σ(price·size) / Σ(size)`, or 0 when the side carries no volume.
pub fn side_vwap(entries: &[OrderBookLevel3Entry]) -> f64 {
    let (notional, volume) = entries.iter().fold((0.0, 0.0), |(n, v), entry| {
        let size = entry.size_f64();
        (n + entry.price_f64() * size, v + size)
    });

    if volume > 0.0 {
        notional / volume
    } else {
        0.0
    }
}

fn vwap_summary(bids: &[OrderBookLevel3Entry], asks: &[OrderBookLevel3Entry]) -> VwapData {
    let bid_vwap = side_vwap(bids);
    let ask_vwap = side_vwap(asks);
    let mid_price = (bid_vwap + ask_vwap) / 2.0;

    let best_bid = bids.first().map(OrderBookLevel3Entry::price_f64).unwrap_or(0.0);
    let best_ask = asks.first().map(OrderBookLevel3Entry::price_f64).unwrap_or(0.0);
    let spread = best_ask - best_bid;

    let spread_percentage = if mid_price != 0.0 {
        spread / mid_price * 100.0
    } else {
        0.0
    };

    VwapData {
        bid_vwap,
        ask_vwap,
        mid_price,
        spread,
        spread_percentage,
    }
}
