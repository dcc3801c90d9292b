use std::str::FromStr;
use std::time::Duration;

use crate::constants::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub market: MarketConfig,
    pub instrument_cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub tracked_symbols: Vec<String>,
    pub category: String,
    pub volume_interval: String,
    pub long_short_period: String,
    pub orderbook_poll: Duration,
    pub analytics_poll: Duration,
    pub orderbook_depth: usize,
    pub analysis_window: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("MARKET_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .ok_or_else(|| Error::Config("MARKET_API_URL not set".into()))?;
        url::Url::parse(&base_url)?;

        let token = lookup("MARKET_API_TOKEN").filter(|t| !t.is_empty());

        let credentials = match (lookup("MARKET_API_EMAIL"), lookup("MARKET_API_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            (Some(_), None) => {
                return Err(Error::Config(
                    "MARKET_API_PASSWORD must be set together with MARKET_API_EMAIL".into(),
                ))
            }
            _ => None,
        };

        let defaults = MarketConfig::default();

        let tracked_symbols = lookup("TRACKED_SYMBOLS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.tracked_symbols);

        if tracked_symbols.is_empty() {
            return Err(Error::Config("TRACKED_SYMBOLS is empty".into()));
        }

        let market = MarketConfig {
            tracked_symbols,
            category: lookup("MARKET_CATEGORY").unwrap_or(defaults.category),
            volume_interval: lookup("VOLUME_INTERVAL").unwrap_or(defaults.volume_interval),
            long_short_period: lookup("LONG_SHORT_PERIOD").unwrap_or(defaults.long_short_period),
            orderbook_poll: Duration::from_millis(parse_or(
                &lookup,
                "ORDERBOOK_POLL_MS",
                defaults.orderbook_poll.as_millis() as u64,
            )?),
            analytics_poll: Duration::from_millis(parse_or(
                &lookup,
                "ANALYTICS_POLL_MS",
                defaults.analytics_poll.as_millis() as u64,
            )?),
            orderbook_depth: parse_or(&lookup, "ORDERBOOK_DEPTH", defaults.orderbook_depth)?,
            analysis_window: parse_or(&lookup, "ANALYSIS_WINDOW", defaults.analysis_window)?,
        };

        if market.orderbook_poll.is_zero() || market.analytics_poll.is_zero() {
            return Err(Error::Config("poll periods must be greater than zero".into()));
        }

        let instrument_cache_ttl = Duration::from_secs(parse_or(
            &lookup,
            "INSTRUMENT_CACHE_TTL_SECS",
            DEFAULT_INSTRUMENT_CACHE_TTL_SECS,
        )?);

        Ok(Config {
            api: ApiConfig {
                base_url,
                token,
                credentials,
            },
            market,
            instrument_cache_ttl,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: {}", key, raw))),
        None => Ok(default),
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tracked_symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            category: DEFAULT_CATEGORY.to_string(),
            volume_interval: DEFAULT_VOLUME_INTERVAL.to_string(),
            long_short_period: DEFAULT_LONG_SHORT_PERIOD.to_string(),
            orderbook_poll: Duration::from_millis(DEFAULT_ORDERBOOK_POLL_MS),
            analytics_poll: Duration::from_millis(DEFAULT_ANALYTICS_POLL_MS),
            orderbook_depth: DEFAULT_ORDERBOOK_DEPTH,
            analysis_window: DEFAULT_ANALYSIS_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            Config::from_lookup(lookup_from(&[("MARKET_API_URL", "http://localhost:3000/")]))
                .unwrap();
        let defaults = MarketConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert!(config.api.token.is_none());
        assert!(config.api.credentials.is_none());
        assert_eq!(config.market.tracked_symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(config.market.orderbook_depth, 20);
        assert_eq!(config.market.analytics_poll, Duration::from_secs(30));
        assert_eq!(config.market.category, defaults.category);
        assert_eq!(config.market.volume_interval, defaults.volume_interval);
        assert_eq!(config.market.long_short_period, defaults.long_short_period);
        assert_eq!(config.market.orderbook_poll, defaults.orderbook_poll);
        assert_eq!(config.market.analysis_window, defaults.analysis_window);
        assert_eq!(config.instrument_cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_symbols_normalised() {
        let config = Config::from_lookup(lookup_from(&[
            ("MARKET_API_URL", "http://localhost:3000"),
            ("TRACKED_SYMBOLS", " solusdt, ,btcusdt "),
            ("ORDERBOOK_DEPTH", "50"),
        ]))
        .unwrap();

        assert_eq!(config.market.tracked_symbols, vec!["SOLUSDT", "BTCUSDT"]);
        assert_eq!(config.market.orderbook_depth, 50);
    }

    #[test]
    fn test_missing_url_is_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = Config::from_lookup(lookup_from(&[
            ("MARKET_API_URL", "http://localhost:3000"),
            ("ORDERBOOK_POLL_MS", "fast"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("ORDERBOOK_POLL_MS")));
    }

    #[test]
    fn test_zero_poll_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("MARKET_API_URL", "http://localhost:3000"),
            ("ANALYTICS_POLL_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_email_without_password_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("MARKET_API_URL", "http://localhost:3000"),
            ("MARKET_API_EMAIL", "trader@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
