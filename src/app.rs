use std::sync::Arc;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{Config, MarketConfig};
use crate::error::Result;
use crate::event_processor::{process_symbol, AnalysisSettings, SymbolFeeds};
use crate::exchanges::binance::BinanceClient;
use crate::exchanges::bybit::BybitClient;
use crate::exchanges::{Exchange, InstrumentCache};
use crate::market::{
    LongShortRatioData, LongShortSource, MarketApi, OrderBookLevel3, OrderBookSource, VolumeData,
    VolumeSource,
};
use crate::state::MarketBoard;
use crate::utils::{Poller, PollerHandle};

/// The three poll loops owned for one tracked symbol.
pub struct SymbolPollers {
    pub symbol: String,
    pub orderbook: PollerHandle<OrderBookLevel3>,
    pub volume: PollerHandle<Vec<VolumeData>>,
    pub long_short: PollerHandle<Vec<LongShortRatioData>>,
}

impl SymbolPollers {
    pub fn spawn(api: &Arc<MarketApi>, symbol: &str, market: &MarketConfig) -> Self {
        let orderbook = Poller::new(
            OrderBookSource {
                api: api.clone(),
                symbol: symbol.to_string(),
                limit: market.orderbook_depth,
            },
            market.orderbook_poll,
        )
        .spawn();

        let volume = Poller::new(
            VolumeSource {
                api: api.clone(),
                symbol: symbol.to_string(),
                category: market.category.clone(),
                interval: market.volume_interval.clone(),
                limit: market.analysis_window,
            },
            market.analytics_poll,
        )
        .spawn();

        let long_short = Poller::new(
            LongShortSource {
                api: api.clone(),
                symbol: symbol.to_string(),
                category: market.category.clone(),
                period: market.long_short_period.clone(),
                limit: market.analysis_window,
            },
            market.analytics_poll,
        )
        .spawn();

        Self {
            symbol: symbol.to_string(),
            orderbook,
            volume,
            long_short,
        }
    }

    pub fn feeds(&self) -> SymbolFeeds {
        SymbolFeeds {
            orderbook: self.orderbook.subscribe(),
            volume: self.volume.subscribe(),
            long_short: self.long_short.subscribe(),
        }
    }

    pub async fn stop(self) {
        self.orderbook.stop().await;
        self.volume.stop().await;
        self.long_short.stop().await;
        info!("Stopped polling {}", self.symbol);
    }
}

pub async fn run(config: Config) -> Result<()> {
    info!("🔭 Started");
    info!("================================");
    info!("Tracked symbols: {:?}", config.market.tracked_symbols);

    let api = Arc::new(MarketApi::new(&config.api));
    if !api.has_token().await {
        match &config.api.credentials {
            Some(creds) => api.login(&creds.email, &creds.password).await?,
            None => warn!("No API token or credentials configured, requests are unauthenticated"),
        }
    }

    let instruments = InstrumentCache::new(config.instrument_cache_ttl);
    instruments.register(Arc::new(BybitClient::new(&config.market.category)));
    instruments.register(Arc::new(BinanceClient::new()));
    check_listings(&instruments, &config.market.tracked_symbols).await;

    let board = Arc::new(MarketBoard::new());
    let settings = AnalysisSettings {
        orderbook_depth: config.market.orderbook_depth,
        analysis_window: config.market.analysis_window,
    };

    let mut pollers = Vec::new();
    let mut processors: Vec<JoinHandle<()>> = Vec::new();

    for symbol in &config.market.tracked_symbols {
        let symbol_pollers = SymbolPollers::spawn(&api, symbol, &config.market);
        processors.push(tokio::spawn(process_symbol(
            symbol.clone(),
            symbol_pollers.feeds(),
            board.clone(),
            settings,
        )));
        pollers.push(symbol_pollers);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, stopping pollers");

    join_all(pollers.into_iter().map(SymbolPollers::stop)).await;

    // Processors exit once every feed sender is gone.
    for result in join_all(processors).await {
        if let Err(e) = result {
            error!("Analytics task failed: {}", e);
        }
    }

    for symbol in board.symbols() {
        if let Some(mid) = board.get_mid_price(&symbol) {
            info!("Last mid price for {}: {:.4}", symbol, mid);
        }
    }

    Ok(())
}

/// Warn about tracked symbols that neither exchange lists as trading.
/// Lookup failures are logged and otherwise ignored.
async fn check_listings(instruments: &InstrumentCache, symbols: &[String]) {
    for symbol in symbols {
        let mut listed_on = Vec::new();

        for exchange in [Exchange::Bybit, Exchange::Binance] {
            match instruments.find(exchange, symbol).await {
                Ok(Some(instrument)) if instrument.is_trading() => listed_on.push(exchange),
                Ok(Some(instrument)) => warn!(
                    "{} is listed on {} with status {}",
                    symbol, exchange, instrument.status
                ),
                Ok(None) => {}
                Err(e) => warn!("Could not load {} instruments: {}", exchange, e),
            }
        }

        if listed_on.is_empty() {
            warn!("{} is not trading on any known exchange", symbol);
        } else {
            info!("{} trading on {:?}", symbol, listed_on);
        }
    }
}
