pub mod binance;
pub mod bybit;
pub mod cache;
pub mod traits;

pub use cache::InstrumentCache;
pub use traits::{Exchange, Instrument, InstrumentSource};
