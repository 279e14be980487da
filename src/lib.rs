//! # Batch Payout
//!
//! Pays a list of recipients in one batched call bundle, in the chain's native asset or an
//! ERC-20 token, with optional paymaster sponsorship when the connected wallet advertises it.

pub mod asset;
pub mod bindings;
pub mod calls;
pub mod capabilities;
pub mod chain;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod status;
pub mod units;
pub mod wallet;

pub use asset::Asset;
pub use calls::PayoutRow;
pub use config::PayoutConfig;
pub use error::PayoutError;
pub use orchestrator::{BatchPayout, PayoutOutcome};
pub use status::PayoutStatus;
pub use wallet::{BatchId, Notifier, Wallet};
