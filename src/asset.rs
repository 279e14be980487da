//! Payout assets and their on-chain metadata.
use crate::{
    error::WalletError,
    units::{self, NATIVE_DECIMALS},
    wallet::Wallet,
};
use alloy::primitives::{Address, U256};
use futures_util::future::join;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Display symbol of the native asset.
pub const NATIVE_SYMBOL: &str = "ETH";

/// The asset a payout is made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Asset {
    /// The chain's native currency.
    Native,
    /// A fungible token at the given contract address.
    Token(Address),
}

impl Asset {
    /// Infers the asset from an address, treating the zero address as native.
    pub fn infer_from_address(address: Address) -> Self {
        if address.is_zero() {
            Self::Native
        } else {
            Self::Token(address)
        }
    }

    /// Decimal precision of the asset.
    ///
    /// Native is always [`NATIVE_DECIMALS`]. Tokens are read from the contract on every call, so a
    /// precision is never reused across assets. Returns `None` if the read fails.
    pub async fn decimals<W: Wallet + ?Sized>(&self, wallet: &W) -> Option<u8> {
        match self {
            Self::Native => Some(NATIVE_DECIMALS),
            Self::Token(token) => match wallet.token_decimals(*token).await {
                Ok(decimals) => Some(decimals),
                Err(err) => {
                    warn!(%token, %err, "failed to read token decimals");
                    None
                }
            },
        }
    }

    /// Balance of `owner` in smallest units, from the native or the token lookup.
    pub async fn raw_balance<W: Wallet + ?Sized>(
        &self,
        wallet: &W,
        owner: Address,
    ) -> Result<U256, WalletError> {
        match self {
            Self::Native => wallet.native_balance(owner).await,
            Self::Token(token) => wallet.token_balance(*token, owner).await,
        }
    }

    /// Human-scale balance of `owner`, `0.0` while balance or decimals are unavailable.
    pub async fn display_balance<W: Wallet + ?Sized>(&self, wallet: &W, owner: Address) -> f64 {
        let (balance, decimals) =
            join(self.raw_balance(wallet, owner), self.decimals(wallet)).await;
        let balance = match balance {
            Ok(balance) => Some(balance),
            Err(err) => {
                warn!(asset = %self, %owner, %err, "failed to read balance");
                None
            }
        };
        units::to_display(balance, decimals)
    }

    /// Display symbol, falling back to the token address if `symbol()` is unavailable.
    pub async fn symbol<W: Wallet + ?Sized>(&self, wallet: &W) -> String {
        match self {
            Self::Native => NATIVE_SYMBOL.to_string(),
            Self::Token(token) => wallet.token_symbol(*token).await.unwrap_or_else(|err| {
                warn!(%token, %err, "failed to read token symbol");
                token.to_string()
            }),
        }
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Self::infer_from_address(address)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token(address) => write!(f, "{address}"),
        }
    }
}
