use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::analytics::{analyze_depth, analyze_long_short, analyze_volume};
use crate::market::{LongShortRatioData, OrderBookLevel3, VolumeData};
use crate::state::{Feed, MarketBoard};
use crate::utils::PollState;

/// Receivers for the three poll loops of one symbol.
pub struct SymbolFeeds {
    pub orderbook: watch::Receiver<PollState<OrderBookLevel3>>,
    pub volume: watch::Receiver<PollState<Vec<VolumeData>>>,
    pub long_short: watch::Receiver<PollState<Vec<LongShortRatioData>>>,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalysisSettings {
    pub orderbook_depth: usize,
    pub analysis_window: usize,
}

/// Tracks which snapshot / error of a feed has already been handled, so
/// `loading` flips do not trigger recomputation.
#[derive(Default)]
struct Seen {
    updated: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl Seen {
    fn fresh_data<'a, T>(&mut self, state: &'a PollState<T>) -> Option<&'a T> {
        if state.last_updated == self.updated {
            return None;
        }
        self.updated = state.last_updated;
        state.data.as_ref()
    }

    fn fresh_error<T>(&mut self, state: &PollState<T>) -> Option<String> {
        if state.error == self.error {
            return None;
        }
        self.error = state.error.clone();
        state.error.clone()
    }
}

/// Recompute analytics for `symbol` whenever one of its feeds changes.
/// Returns once every feed has been closed.
pub async fn process_symbol(
    symbol: String,
    mut feeds: SymbolFeeds,
    board: Arc<MarketBoard>,
    settings: AnalysisSettings,
) {
    info!("Starting analytics for {}", symbol);

    let mut book_seen = Seen::default();
    let mut volume_seen = Seen::default();
    let mut ratio_seen = Seen::default();

    loop {
        tokio::select! {
            Ok(()) = feeds.orderbook.changed() => {
                let state = feeds.orderbook.borrow_and_update().clone();
                handle_orderbook(&symbol, &state, &mut book_seen, &board, settings);
            }
            Ok(()) = feeds.volume.changed() => {
                let state = feeds.volume.borrow_and_update().clone();
                handle_volume(&symbol, &state, &mut volume_seen, &board, settings);
            }
            Ok(()) = feeds.long_short.changed() => {
                let state = feeds.long_short.borrow_and_update().clone();
                handle_long_short(&symbol, &state, &mut ratio_seen, &board, settings);
            }
            else => {
                warn!("All feeds closed, stopping analytics for {}", symbol);
                break;
            }
        }
    }
}

fn handle_orderbook(
    symbol: &str,
    state: &PollState<OrderBookLevel3>,
    seen: &mut Seen,
    board: &MarketBoard,
    settings: AnalysisSettings,
) {
    if let Some(error) = seen.fresh_error(state) {
        board.record_error(symbol, Feed::OrderBook, error);
    }

    let Some(book) = seen.fresh_data(state) else {
        return;
    };

    let depth = analyze_depth(book, settings.orderbook_depth);
    match depth.vwap {
        Some(vwap) => info!(
            "📖 {} book | mid {:.4} | spread {:.4} ({:.3}%) | bid vwap {:.4} | ask vwap {:.4} | depth {:.3} / {:.3}",
            symbol,
            vwap.mid_price,
            vwap.spread,
            vwap.spread_percentage,
            vwap.bid_vwap,
            vwap.ask_vwap,
            depth.total_bid_volume(),
            depth.total_ask_volume(),
        ),
        None => warn!("{} book snapshot has an empty side", symbol),
    }

    board.update_depth(symbol, depth);
}

fn handle_volume(
    symbol: &str,
    state: &PollState<Vec<VolumeData>>,
    seen: &mut Seen,
    board: &MarketBoard,
    settings: AnalysisSettings,
) {
    if let Some(error) = seen.fresh_error(state) {
        board.record_error(symbol, Feed::Volume, error);
    }

    let Some(series) = seen.fresh_data(state) else {
        return;
    };

    let analysis = analyze_volume(series, settings.analysis_window);
    if let Some(a) = &analysis {
        info!(
            "📊 {} volume | {:.2} vs avg {:.2} (x{:.2}) | {} / {} | {}",
            symbol,
            a.current_volume,
            a.average_volume,
            a.volume_ratio,
            a.strength.as_str(),
            a.trend.as_str(),
            a.recommendation,
        );
    }

    board.update_volume(symbol, analysis);
}

fn handle_long_short(
    symbol: &str,
    state: &PollState<Vec<LongShortRatioData>>,
    seen: &mut Seen,
    board: &MarketBoard,
    settings: AnalysisSettings,
) {
    if let Some(error) = seen.fresh_error(state) {
        board.record_error(symbol, Feed::LongShort, error);
    }

    let Some(series) = seen.fresh_data(state) else {
        return;
    };

    let analysis = analyze_long_short(series, settings.analysis_window);
    if let Some(a) = &analysis {
        info!(
            "⚖️  {} long/short | buy {:.3} sell {:.3} (ls {:.2}) | {} / {} | {}",
            symbol,
            a.buy_ratio,
            a.sell_ratio,
            a.long_short_ratio,
            a.sentiment.as_str(),
            a.trend.as_str(),
            a.recommendation,
        );
    }

    board.update_long_short(symbol, analysis);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{BookSide, OrderBookLevel3Entry};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn book() -> OrderBookLevel3 {
        OrderBookLevel3 {
            symbol: "BTCUSDT".to_string(),
            bids: vec![OrderBookLevel3Entry::new("100", "1", BookSide::Buy)],
            asks: vec![OrderBookLevel3Entry::new("102", "1", BookSide::Sell)],
            timestamp: 0,
            update_id: None,
        }
    }

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            orderbook_depth: 20,
            analysis_window: 24,
        }
    }

    #[test]
    fn test_seen_ignores_loading_flips() {
        let mut seen = Seen::default();
        let mut state = PollState {
            data: Some(1),
            error: None,
            loading: false,
            last_updated: Some(Utc::now()),
        };

        assert_eq!(seen.fresh_data(&state), Some(&1));
        state.loading = true;
        assert_eq!(seen.fresh_data(&state), None);

        state.error = Some("HTTP 500".into());
        assert_eq!(seen.fresh_error(&state), Some("HTTP 500".to_string()));
        assert_eq!(seen.fresh_error(&state), None);
    }

    #[test]
    fn test_handle_orderbook_updates_board() {
        let board = MarketBoard::new();
        let mut seen = Seen::default();
        let state = PollState {
            data: Some(book()),
            error: None,
            loading: false,
            last_updated: Some(Utc::now()),
        };

        handle_orderbook("BTCUSDT", &state, &mut seen, &board, settings());
        assert_eq!(board.get_mid_price("BTCUSDT"), Some(101.0));

        let failed = PollState {
            error: Some("HTTP 502".into()),
            ..state
        };
        handle_orderbook("BTCUSDT", &failed, &mut seen, &board, settings());

        let summary = board.get_summary("BTCUSDT").unwrap();
        assert!(summary.is_stale());
        assert_eq!(board.get_mid_price("BTCUSDT"), Some(101.0));
    }

    #[tokio::test]
    async fn test_process_symbol_stops_when_feeds_close() {
        let board = Arc::new(MarketBoard::new());
        let (book_tx, book_rx) = watch::channel(PollState::default());
        let (volume_tx, volume_rx) = watch::channel(PollState::default());
        let (ratio_tx, ratio_rx) = watch::channel(PollState::default());

        let task = tokio::spawn(process_symbol(
            "BTCUSDT".to_string(),
            SymbolFeeds {
                orderbook: book_rx,
                volume: volume_rx,
                long_short: ratio_rx,
            },
            board.clone(),
            settings(),
        ));

        book_tx.send_modify(|s| {
            s.data = Some(book());
            s.last_updated = Some(Utc::now());
        });

        timeout(Duration::from_secs(2), async {
            while board.get_mid_price("BTCUSDT").is_none() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        drop(book_tx);
        drop(volume_tx);
        drop(ratio_tx);

        timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
    }
}
