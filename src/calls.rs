use crate::{
    asset::Asset,
    bindings::IERC20,
    error::{PayoutError, RowError},
    status::Mechanism,
    units,
};
use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One recipient instruction as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRow {
    /// Recipient address.
    pub wallet: String,
    /// Human-scale amount, e.g. `"1.5"`.
    pub amount: String,
}

impl PayoutRow {
    pub fn new(wallet: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { wallet: wallet.into(), amount: amount.into() }
    }

    /// Validates the row and scales its amount with the asset's `decimals`.
    pub fn scale(&self, decimals: u8) -> Result<ScaledTransfer, RowError> {
        let recipient = Address::from_str(self.wallet.trim())
            .map_err(|_| RowError::Address(self.wallet.clone()))?;
        let amount = units::to_raw(&self.amount, decimals)?;
        Ok(ScaledTransfer { recipient, amount })
    }
}

impl FromStr for PayoutRow {
    type Err = RowError;

    /// Parses `ADDRESS:AMOUNT` or `ADDRESS,AMOUNT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (wallet, amount) = s
            .split_once(':')
            .or_else(|| s.split_once(','))
            .ok_or_else(|| RowError::Malformed(s.to_string()))?;
        Ok(Self::new(wallet.trim(), amount.trim()))
    }
}

/// A [`PayoutRow`] converted to smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledTransfer {
    pub recipient: Address,
    pub amount: U256,
}

/// Scales every row, failing on the first invalid one.
pub fn scale_rows(rows: &[PayoutRow], decimals: u8) -> Result<Vec<ScaledTransfer>, PayoutError> {
    if rows.is_empty() {
        return Err(PayoutError::EmptyBatch);
    }
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            row.scale(decimals).map_err(|source| PayoutError::InvalidRow { index, source })
        })
        .collect()
}

/// A plain value transfer, no calldata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCall {
    pub to: Address,
    pub value: U256,
}

impl From<&ScaledTransfer> for NativeCall {
    fn from(transfer: &ScaledTransfer) -> Self {
        Self { to: transfer.recipient, value: transfer.amount }
    }
}

/// A `transfer(to, amount)` call against a token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractCall {
    pub address: Address,
    pub to: Address,
    pub amount: U256,
}

impl ContractCall {
    pub const FUNCTION_NAME: &'static str = "transfer";

    pub fn transfer(token: Address, transfer: &ScaledTransfer) -> Self {
        Self { address: token, to: transfer.recipient, amount: transfer.amount }
    }

    /// ABI-encoded calldata.
    pub fn calldata(&self) -> Bytes {
        IERC20::transferCall::from(self).abi_encode().into()
    }
}

impl From<&ContractCall> for IERC20::transferCall {
    fn from(call: &ContractCall) -> Self {
        IERC20::transferCall { to: call.to, amount: call.amount }
    }
}

/// One call of a batch, shaped for its asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEntry {
    Native(NativeCall),
    Contract(ContractCall),
}

impl Asset {
    /// Builds the call paying out `transfer` in this asset.
    pub fn build_call(&self, transfer: &ScaledTransfer) -> CallEntry {
        match self {
            Asset::Native => CallEntry::Native(transfer.into()),
            Asset::Token(token) => CallEntry::Contract(ContractCall::transfer(*token, transfer)),
        }
    }
}

/// Calls of one payout, grouped by the submission path they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallBatch {
    Native(Vec<NativeCall>),
    Token(Vec<ContractCall>),
}

impl CallBatch {
    /// Builds one call per transfer, in order.
    pub fn build(asset: &Asset, transfers: &[ScaledTransfer]) -> Self {
        let mut batch = match asset {
            Asset::Native => Self::Native(Vec::with_capacity(transfers.len())),
            Asset::Token(_) => Self::Token(Vec::with_capacity(transfers.len())),
        };
        for transfer in transfers {
            batch.push(asset.build_call(transfer));
        }
        batch
    }

    fn push(&mut self, entry: CallEntry) {
        match (self, entry) {
            (Self::Native(calls), CallEntry::Native(call)) => calls.push(call),
            (Self::Token(calls), CallEntry::Contract(call)) => calls.push(call),
            _ => debug_assert!(false, "call entry does not match the batch kind"),
        }
    }

    /// The submission mechanism this batch goes through.
    pub fn mechanism(&self) -> Mechanism {
        match self {
            Self::Native(_) => Mechanism::SendCalls,
            Self::Token(_) => Mechanism::WriteContracts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Native(calls) => calls.len(),
            Self::Token(calls) => calls.len(),
        }
    }
}
