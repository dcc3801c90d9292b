//! Backend REST client for market snapshots and login

use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use super::models::*;
use crate::config::ApiConfig;
use crate::constants::{LOGIN_PATH, LONG_SHORT_RATIO_PATH, ORDERBOOK_L3_PATH, VOLUME_PATH};
use crate::error::{Error, Result};

pub struct MarketApi {
    http: HttpClient,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl MarketApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_client(HttpClient::new(), config)
    }

    pub fn with_client(http: HttpClient, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(config.token.clone()),
        }
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Exchange credentials for a bearer token and keep it for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);

        let resp = self
            .http
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Auth("Invalid email or password".into()));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::Auth("Too many login attempts, try again later".into()));
            }
            status if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Http(format!("HTTP {}: {}", status, body)));
            }
            _ => {}
        }

        let data: LoginResponse = resp
            .json()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        *self.token.write().await = Some(data.token);
        info!("Logged in to market API as {}", email);
        Ok(())
    }

    pub async fn fetch_orderbook_l3(&self, symbol: &str, limit: usize) -> Result<OrderBookLevel3> {
        let url = self.endpoint(
            &format!("{}/{}", ORDERBOOK_L3_PATH, symbol),
            &[("limit", limit.to_string())],
        )?;
        self.get_data(url).await
    }

    pub async fn fetch_volume(
        &self,
        symbol: &str,
        category: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<VolumeData>> {
        let url = self.endpoint(
            &format!("{}/{}", VOLUME_PATH, symbol),
            &[
                ("category", category.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        self.get_data(url).await
    }

    pub async fn fetch_long_short_ratio(
        &self,
        symbol: &str,
        category: &str,
        period: &str,
        limit: usize,
    ) -> Result<Vec<LongShortRatioData>> {
        let url = self.endpoint(
            &format!("{}/{}", LONG_SHORT_RATIO_PATH, symbol),
            &[
                ("category", category.to_string()),
                ("period", period.to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        self.get_data(url).await
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), params)?;
        Ok(url)
    }

    async fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);

        let req = self.authorize(self.http.get(url.clone())).await;
        let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth("Session expired, please log in again".into()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!("HTTP {}: {}", status, body)));
        }

        let envelope: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        unwrap_envelope(envelope, url.path())
    }
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>, path: &str) -> Result<T> {
    if !envelope.success {
        return Err(Error::Api(
            envelope
                .message
                .unwrap_or_else(|| format!("request to {} failed", path)),
        ));
    }

    envelope
        .data
        .ok_or_else(|| Error::Api(format!("response from {} has no data", path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> MarketApi {
        MarketApi::new(&ApiConfig {
            base_url: "http://localhost:3000/".to_string(),
            token: Some("secret".to_string()),
            credentials: None,
        })
    }

    #[test]
    fn test_endpoint_encodes_params() {
        let url = api()
            .endpoint(
                "/api/market/volume/BTCUSDT",
                &[("category", "linear".to_string()), ("interval", "1h".to_string())],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/market/volume/BTCUSDT?category=linear&interval=1h"
        );
    }

    #[tokio::test]
    async fn test_configured_token_kept() {
        assert!(api().has_token().await);
    }

    #[test]
    fn test_unwrap_envelope() {
        let ok = ApiResponse {
            success: true,
            data: Some(5),
            message: None,
        };
        assert_eq!(unwrap_envelope(ok, "/x").unwrap(), 5);

        let failed: ApiResponse<i32> = ApiResponse {
            success: false,
            data: None,
            message: Some("rate limited".into()),
        };
        assert!(matches!(unwrap_envelope(failed, "/x"), Err(Error::Api(m)) if m == "rate limited"));

        let empty: ApiResponse<i32> = ApiResponse {
            success: true,
            data: None,
            message: None,
        };
        assert!(matches!(unwrap_envelope(empty, "/x"), Err(Error::Api(_))));
    }
}
