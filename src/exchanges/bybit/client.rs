use std::future::Future;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, info, warn};
use url::Url;

use super::models::{BybitInstrument, BybitResponse, InstrumentsInfo};
use crate::constants::BYBIT_REST_URL;
use crate::error::{Error, Result};
use crate::exchanges::{Exchange, Instrument, InstrumentSource};

const INSTRUMENTS_PATH: &str = "/v5/market/instruments-info";
const PAGE_LIMIT: u32 = 1000;
const MAX_PAGES: usize = 50;

pub struct BybitClient {
    http: HttpClient,
    base_url: String,
    category: String,
}

impl BybitClient {
    pub fn new(category: &str) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: BYBIT_REST_URL.to_string(),
            category: category.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn instruments_url(&self, cursor: Option<&str>) -> Result<Url> {
        let params = [
            ("category", self.category.clone()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        let mut url =
            Url::parse_with_params(&format!("{}{}", self.base_url, INSTRUMENTS_PATH), &params)?;

        // Bybit returns the cursor already percent-encoded; pass it through as is.
        if let Some(c) = cursor {
            let query = format!("{}&cursor={}", url.query().unwrap_or_default(), c);
            url.set_query(Some(&query));
        }

        Ok(url)
    }

    pub async fn fetch_instruments_page(&self, cursor: Option<&str>) -> Result<InstrumentsInfo> {
        let url = self.instruments_url(cursor)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!("HTTP {}: {}", status, body)));
        }

        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        parse_instruments_page(&body)
    }
}

fn parse_instruments_page(body: &str) -> Result<InstrumentsInfo> {
    let data: BybitResponse<InstrumentsInfo> = serde_json::from_str(body)?;

    if data.ret_code != 0 {
        return Err(Error::Api(format!("bybit {}: {}", data.ret_code, data.ret_msg)));
    }

    data.result
        .ok_or_else(|| Error::Api("bybit instruments-info returned no result".into()))
}

/// Follow `nextPageCursor` until it is empty, repeats, or `MAX_PAGES` is hit.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<BybitInstrument>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<InstrumentsInfo>>,
{
    let mut instruments = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let page = fetch_page(cursor.clone()).await?;
        instruments.extend(page.list);

        match page.next_page_cursor {
            Some(next) if next.is_empty() => return Ok(instruments),
            Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                warn!("Bybit repeated page cursor {}, stopping pagination", next);
                return Ok(instruments);
            }
            Some(next) => cursor = Some(next),
            None => return Ok(instruments),
        }
    }

    warn!("Bybit pagination stopped after {} pages", MAX_PAGES);
    Ok(instruments)
}

#[async_trait]
impl InstrumentSource for BybitClient {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    async fn fetch_instruments(&self) -> Result<Vec<Instrument>> {
        let pages = collect_pages(|cursor| async move {
            self.fetch_instruments_page(cursor.as_deref()).await
        })
        .await?;
        let instruments: Vec<Instrument> = pages.iter().map(|i| i.to_instrument()).collect();

        info!("Fetched {} {} instruments from Bybit", instruments.len(), self.category);
        Ok(instruments)
    }
}
