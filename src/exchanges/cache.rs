use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use super::{Exchange, Instrument, InstrumentSource};
use crate::error::{Error, Result};

#[derive(Clone)]
struct CachedInstruments {
    fetched_at: Instant,
    instruments: Arc<Vec<Instrument>>,
}

/// Per-exchange instrument lists, refetched once older than the TTL.
pub struct InstrumentCache {
    ttl: Duration,
    sources: DashMap<Exchange, Arc<dyn InstrumentSource>>,
    entries: DashMap<Exchange, CachedInstruments>,
}

impl InstrumentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sources: DashMap::new(),
            entries: DashMap::new(),
        }
    }

    pub fn register(&self, source: Arc<dyn InstrumentSource>) {
        let exchange = source.exchange();
        self.sources.insert(exchange, source);
        self.entries.remove(&exchange);
    }

    pub fn invalidate(&self, exchange: Exchange) {
        self.entries.remove(&exchange);
    }

    pub async fn instruments(&self, exchange: Exchange) -> Result<Arc<Vec<Instrument>>> {
        if let Some(entry) = self.fresh_entry(exchange) {
            debug!("Instrument cache hit for {}", exchange);
            return Ok(entry.instruments);
        }

        // Clone the source out so no map guard is held across the fetch.
        let source = self
            .sources
            .get(&exchange)
            .map(|s| s.value().clone())
            .ok_or_else(|| {
                Error::Other(format!("no instrument source registered for {}", exchange))
            })?;

        let instruments = Arc::new(source.fetch_instruments().await?);
        self.entries.insert(
            exchange,
            CachedInstruments {
                fetched_at: Instant::now(),
                instruments: instruments.clone(),
            },
        );

        Ok(instruments)
    }

    pub async fn find(&self, exchange: Exchange, symbol: &str) -> Result<Option<Instrument>> {
        let instruments = self.instruments(exchange).await?;
        Ok(instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
            .cloned())
    }

    fn fresh_entry(&self, exchange: Exchange) -> Option<CachedInstruments> {
        self.entries
            .get(&exchange)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InstrumentSource for CountingSource {
        fn exchange(&self) -> Exchange {
            Exchange::Bybit
        }

        async fn fetch_instruments(&self) -> Result<Vec<Instrument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Instrument {
                exchange: Exchange::Bybit,
                symbol: "BTCUSDT".to_string(),
                base_asset: "BTC".to_string(),
                quote_asset: "USDT".to_string(),
                status: "Trading".to_string(),
                tick_size: Some(0.1),
                qty_step: Some(0.001),
                min_qty: Some(0.001),
            }])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl InstrumentSource for FailingSource {
        fn exchange(&self) -> Exchange {
            Exchange::Binance
        }

        async fn fetch_instruments(&self) -> Result<Vec<Instrument>> {
            Err(Error::Http("HTTP 418: banned".into()))
        }
    }

    fn cache_with_counter(ttl: Duration) -> (InstrumentCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = InstrumentCache::new(ttl);
        cache.register(Arc::new(CountingSource {
            calls: calls.clone(),
        }));
        (cache, calls)
    }

    #[tokio::test]
    async fn test_served_from_cache_within_ttl() {
        let (cache, calls) = cache_with_counter(Duration::from_secs(3600));

        let first = assert_ok!(cache.instruments(Exchange::Bybit).await);
        let second = assert_ok!(cache.instruments(Exchange::Bybit).await);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_refetched_after_expiry() {
        let (cache, calls) = cache_with_counter(Duration::ZERO);

        assert_ok!(cache.instruments(Exchange::Bybit).await);
        assert_ok!(cache.instruments(Exchange::Bybit).await);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (cache, calls) = cache_with_counter(Duration::from_secs(3600));

        assert_ok!(cache.instruments(Exchange::Bybit).await);
        cache.invalidate(Exchange::Bybit);
        assert_ok!(cache.instruments(Exchange::Bybit).await);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let (cache, _) = cache_with_counter(Duration::from_secs(3600));

        let found = assert_ok!(cache.find(Exchange::Bybit, "btcusdt").await);
        assert_eq!(found.map(|i| i.base_asset), Some("BTC".to_string()));

        let missing = assert_ok!(cache.find(Exchange::Bybit, "DOGEUSDT").await);
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_unregistered_and_failing_sources() {
        let cache = InstrumentCache::new(Duration::from_secs(3600));
        assert_err!(cache.instruments(Exchange::Bybit).await);

        cache.register(Arc::new(FailingSource));
        let err = assert_err!(cache.instruments(Exchange::Binance).await);
        assert!(matches!(err, Error::Http(_)));
    }
}
