pub mod analytics;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod event_processor;
pub mod exchanges;
pub mod logging;
pub mod market;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
