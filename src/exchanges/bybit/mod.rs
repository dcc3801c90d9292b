pub mod client;
pub mod models;

pub use client::BybitClient;
pub use models::*;
