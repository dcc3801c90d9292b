//! Poll sources for the three backend market endpoints

use std::sync::Arc;

use async_trait::async_trait;

use super::api::MarketApi;
use super::models::{LongShortRatioData, OrderBookLevel3, VolumeData};
use crate::error::Result;
use crate::utils::poller::SnapshotSource;

pub struct OrderBookSource {
    pub api: Arc<MarketApi>,
    pub symbol: String,
    pub limit: usize,
}

#[async_trait]
impl SnapshotSource for OrderBookSource {
    type Snapshot = OrderBookLevel3;

    fn name(&self) -> String {
        format!("orderbook-l3/{}", self.symbol)
    }

    async fn fetch(&self) -> Result<OrderBookLevel3> {
        self.api.fetch_orderbook_l3(&self.symbol, self.limit).await
    }
}

pub struct VolumeSource {
    pub api: Arc<MarketApi>,
    pub symbol: String,
    pub category: String,
    pub interval: String,
    pub limit: usize,
}

#[async_trait]
impl SnapshotSource for VolumeSource {
    type Snapshot = Vec<VolumeData>;

    fn name(&self) -> String {
        format!("volume/{}@{}", self.symbol, self.interval)
    }

    async fn fetch(&self) -> Result<Vec<VolumeData>> {
        self.api
            .fetch_volume(&self.symbol, &self.category, &self.interval, self.limit)
            .await
    }
}

pub struct LongShortSource {
    pub api: Arc<MarketApi>,
    pub symbol: String,
    pub category: String,
    pub period: String,
    pub limit: usize,
}

#[async_trait]
impl SnapshotSource for LongShortSource {
    type Snapshot = Vec<LongShortRatioData>;

    fn name(&self) -> String {
        format!("long-short-ratio/{}@{}", self.symbol, self.period)
    }

    async fn fetch(&self) -> Result<Vec<LongShortRatioData>> {
        self.api
            .fetch_long_short_ratio(&self.symbol, &self.category, &self.period, self.limit)
            .await
    }
}
