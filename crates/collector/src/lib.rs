pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod report;
pub mod snapshot;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
