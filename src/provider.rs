//! [`Wallet`] over an alloy [`Provider`] talking to an EIP-5792 capable node or wallet.
use std::marker::PhantomData;

use crate::{
    bindings::IERC20,
    calls::{ContractCall, NativeCall},
    capabilities::{SponsorshipConfig, WalletCapabilities},
    chain::Session,
    error::WalletError,
    wallet::{BatchId, SendCallsRequest, Wallet, WriteContractsRequest},
};
use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, U256, U64},
    providers::Provider,
    transports::Transport,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// EIP-5792 request version sent with `wallet_sendCalls`.
const SEND_CALLS_VERSION: &str = "1.0";

/// One entry of a `wallet_sendCalls` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletCall {
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

impl From<NativeCall> for WalletCall {
    fn from(call: NativeCall) -> Self {
        Self { to: call.to, value: Some(call.value), data: None }
    }
}

impl From<ContractCall> for WalletCall {
    fn from(call: ContractCall) -> Self {
        Self { to: call.address, value: None, data: Some(call.calldata()) }
    }
}

/// Request parameters for `wallet_sendCalls`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCallsParameters {
    pub version: &'static str,
    pub chain_id: U64,
    pub from: Address,
    pub calls: Vec<WalletCall>,
    pub capabilities: SponsorshipConfig,
}

/// `wallet_sendCalls` returns a bare id in early drafts and `{ id }` later on.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SendCallsResponse {
    Id(String),
    Object { id: String },
}

impl From<SendCallsResponse> for BatchId {
    fn from(response: SendCallsResponse) -> Self {
        match response {
            SendCallsResponse::Id(id) | SendCallsResponse::Object { id } => BatchId::new(id),
        }
    }
}

/// Wallet backed by an alloy provider whose node exposes the `wallet_` namespace.
pub struct ProviderWallet<P, T> {
    provider: P,
    account: Address,
    _phantom: PhantomData<fn() -> T>,
}

impl<P, T> ProviderWallet<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(provider: P, account: Address) -> Self {
        Self { provider, account, _phantom: PhantomData }
    }

    async fn send_wallet_calls(
        &self,
        calls: Vec<WalletCall>,
        capabilities: SponsorshipConfig,
    ) -> Result<BatchId, WalletError> {
        let chain_id = self.provider.get_chain_id().await?;
        let params = SendCallsParameters {
            version: SEND_CALLS_VERSION,
            chain_id: U64::from(chain_id),
            from: self.account,
            calls,
            capabilities,
        };
        trace!(calls = params.calls.len(), chain_id, "wallet_sendCalls");
        let response: SendCallsResponse =
            self.provider.raw_request("wallet_sendCalls".into(), (params,)).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl<P, T> Wallet for ProviderWallet<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn session(&self) -> Result<Session, WalletError> {
        let chain_id = self.provider.get_chain_id().await?;
        Ok(Session::new(self.account, Some(chain_id)))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, WalletError> {
        Ok(self.provider.get_balance(owner).await?)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        let erc20 = IERC20::new(token, &self.provider);
        Ok(erc20.balanceOf(owner).call().await?._0)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, WalletError> {
        let erc20 = IERC20::new(token, &self.provider);
        Ok(erc20.decimals().call().await?._0)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, WalletError> {
        let erc20 = IERC20::new(token, &self.provider);
        Ok(erc20.symbol().call().await?._0)
    }

    async fn capabilities(&self, account: Address) -> Result<WalletCapabilities, WalletError> {
        Ok(self.provider.raw_request("wallet_getCapabilities".into(), (account,)).await?)
    }

    async fn send_calls(&self, request: SendCallsRequest) -> Result<BatchId, WalletError> {
        let calls = request.calls.into_iter().map(WalletCall::from).collect();
        self.send_wallet_calls(calls, request.sponsorship).await
    }

    async fn write_contracts(
        &self,
        request: WriteContractsRequest,
    ) -> Result<BatchId, WalletError> {
        let calls = request.calls.into_iter().map(WalletCall::from).collect();
        self.send_wallet_calls(calls, request.sponsorship).await
    }
}
