pub const BYBIT_REST_URL: &str = "https://api.bybit.com";
pub const BINANCE_FUTURES_REST_URL: &str = "https://fapi.binance.com";

pub const ORDERBOOK_L3_PATH: &str = "/api/market/orderbook-l3";
pub const VOLUME_PATH: &str = "/api/market/volume";
pub const LONG_SHORT_RATIO_PATH: &str = "/api/market/long-short-ratio";
pub const LOGIN_PATH: &str = "/auth/login";

pub const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT"];
pub const DEFAULT_CATEGORY: &str = "linear";
pub const DEFAULT_VOLUME_INTERVAL: &str = "1h";
pub const DEFAULT_LONG_SHORT_PERIOD: &str = "1h";

pub const DEFAULT_ORDERBOOK_POLL_MS: u64 = 2_000;
pub const DEFAULT_ANALYTICS_POLL_MS: u64 = 30_000;
pub const DEFAULT_ORDERBOOK_DEPTH: usize = 20;
pub const DEFAULT_ANALYSIS_WINDOW: usize = 24;
pub const DEFAULT_INSTRUMENT_CACHE_TTL_SECS: u64 = 3_600;
