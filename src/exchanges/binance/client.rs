use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, info};

use super::models::ExchangeInfo;
use crate::constants::BINANCE_FUTURES_REST_URL;
use crate::error::{Error, Result};
use crate::exchanges::{Exchange, Instrument, InstrumentSource};

const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";

pub struct BinanceClient {
    http: HttpClient,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
            base_url: BINANCE_FUTURES_REST_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub async fn fetch_exchange_info(&self) -> Result<ExchangeInfo> {
        let url = format!("{}{}", self.base_url, EXCHANGE_INFO_PATH);
        debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!("HTTP {}: {}", status, body)));
        }

        resp.json()
            .await
            .map_err(|e| Error::Http(e.to_string()))
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstrumentSource for BinanceClient {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn fetch_instruments(&self) -> Result<Vec<Instrument>> {
        let info = self.fetch_exchange_info().await?;
        let instruments: Vec<Instrument> = info.symbols.iter().map(|s| s.to_instrument()).collect();

        info!("Fetched {} instruments from Binance futures", instruments.len());
        Ok(instruments)
    }
}
