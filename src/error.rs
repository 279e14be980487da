//! Payout error types.
use alloy::transports::TransportError;
use thiserror::Error;

/// Errors raised while converting a human-entered amount to smallest units.
#[derive(Debug, Error)]
pub enum AmountError {
    /// The amount is empty, negative or not a plain decimal number.
    #[error("invalid amount {0:?}")]
    Invalid(String),
    /// The scaled amount does not fit in 256 bits.
    #[error("amount {0:?} overflows 256 bits")]
    Overflow(String),
    /// The amount does not fit the unit conversion.
    #[error(transparent)]
    Units(#[from] alloy::primitives::utils::UnitsError),
}

/// Errors related to a single payout row.
#[derive(Debug, Error)]
pub enum RowError {
    /// The recipient is not a well-formed 20 byte address.
    #[error("invalid recipient address {0:?}")]
    Address(String),
    /// The amount could not be scaled.
    #[error(transparent)]
    Amount(#[from] AmountError),
    /// The textual row is not of the form `ADDRESS:AMOUNT`.
    #[error("malformed row {0:?}, expected ADDRESS:AMOUNT")]
    Malformed(String),
}

/// Errors returned by a [`Wallet`](crate::wallet::Wallet) implementation.
#[derive(Debug, Error)]
pub enum WalletError {
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A contract read failed.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// The wallet refused the request.
    #[error("wallet rejected the request: {0}")]
    Rejected(String),
}

/// The overarching error type returned by [`BatchPayout::payout`](crate::BatchPayout::payout).
#[derive(Debug, Error)]
pub enum PayoutError {
    /// No rows were supplied.
    #[error("no payout rows supplied")]
    EmptyBatch,
    /// A row failed validation before any call was built.
    #[error("row {index}: {source}")]
    InvalidRow {
        /// Position of the row in the submitted list.
        index: usize,
        /// Why the row was rejected.
        #[source]
        source: RowError,
    },
    /// The wallet rejected or failed the batch submission.
    #[error("payout submission failed: {0}")]
    Submission(#[source] WalletError),
}
