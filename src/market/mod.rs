pub mod api;
pub mod models;
pub mod sources;

pub use api::MarketApi;
pub use models::*;
pub use sources::{LongShortSource, OrderBookSource, VolumeSource};
