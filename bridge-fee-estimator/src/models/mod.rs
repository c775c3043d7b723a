//! Data models used throughout the application
//!
//! Chains, tokens and transfers mirror the on-chain structs; quotes and snapshots
//! mirror the JSON payloads this service produces and consumes.

pub mod amount;
pub mod chain;
// JSON-RPC protocol data structures
pub mod jsonrpc;
pub mod quote;
pub mod snapshot;
pub mod token;
pub mod transfer;

pub use chain::{Chain, ChainSlug};
pub use quote::{AmmData, LiquidityCheck, SendData};
pub use token::{Token, TokenMetadata};
pub use transfer::{SendOptions, Transfer};
