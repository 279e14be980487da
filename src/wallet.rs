//! The wallet seam: everything the payout core needs from the connected wallet and chain.

use crate::{
    calls::{ContractCall, NativeCall},
    capabilities::{SponsorshipConfig, WalletCapabilities},
    chain::Session,
    error::WalletError,
};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::warn;

/// Opaque identifier of a submitted call batch.
///
/// Depending on the wallet this is a transaction hash or a bundle id; callers should not parse it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Batch of plain value transfers, submitted through the direct calls path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCallsRequest {
    pub calls: Vec<NativeCall>,
    pub sponsorship: SponsorshipConfig,
}

/// Batch of contract writes, submitted through the contract-write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteContractsRequest {
    pub calls: Vec<ContractCall>,
    pub sponsorship: SponsorshipConfig,
}

/// A connected wallet able to read balances and submit call batches.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The connected account and its active chain.
    async fn session(&self) -> Result<Session, WalletError>;

    /// Native balance of `owner` in wei.
    async fn native_balance(&self, owner: Address) -> Result<U256, WalletError>;

    /// `balanceOf(owner)` on the `token` contract.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError>;

    /// `decimals()` on the `token` contract.
    async fn token_decimals(&self, token: Address) -> Result<u8, WalletError>;

    /// `symbol()` on the `token` contract.
    async fn token_symbol(&self, token: Address) -> Result<String, WalletError>;

    /// Capabilities the wallet advertises for `account`, keyed by chain.
    async fn capabilities(&self, account: Address) -> Result<WalletCapabilities, WalletError>;

    /// Submits a batch of value transfers.
    async fn send_calls(&self, request: SendCallsRequest) -> Result<BatchId, WalletError>;

    /// Submits a batch of contract writes.
    async fn write_contracts(&self, request: WriteContractsRequest)
        -> Result<BatchId, WalletError>;
}

#[async_trait]
impl<W: Wallet + ?Sized> Wallet for Arc<W> {
    async fn session(&self) -> Result<Session, WalletError> {
        (**self).session().await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, WalletError> {
        (**self).native_balance(owner).await
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        (**self).token_balance(token, owner).await
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, WalletError> {
        (**self).token_decimals(token).await
    }

    async fn token_symbol(&self, token: Address) -> Result<String, WalletError> {
        (**self).token_symbol(token).await
    }

    async fn capabilities(&self, account: Address) -> Result<WalletCapabilities, WalletError> {
        (**self).capabilities(account).await
    }

    async fn send_calls(&self, request: SendCallsRequest) -> Result<BatchId, WalletError> {
        (**self).send_calls(request).await
    }

    async fn write_contracts(
        &self,
        request: WriteContractsRequest,
    ) -> Result<BatchId, WalletError> {
        (**self).write_contracts(request).await
    }
}

/// Receives the user-facing failure signal of a payout.
pub trait Notifier: Send + Sync {
    fn payout_failed(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn payout_failed(&self, message: &str) {
        (**self).payout_failed(message)
    }
}

/// [`Notifier`] that only writes the failure to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn payout_failed(&self, message: &str) {
        warn!(target: "batch_payout::notify", "{message}");
    }
}
