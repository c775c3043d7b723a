// Export modules for testing and benchmarking
pub mod api;
pub mod config;
pub mod contracts;
pub mod error;
pub mod estimator;
pub mod explorer;
pub mod fees;
pub mod liquidity;
pub mod models;
pub mod price_feed;
pub mod rpc;
pub mod snapshot;
pub mod transfer;
