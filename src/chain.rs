use alloy::primitives::{Address, ChainId};

/// The connected account and the chain it is currently pointed at.
///
/// The chain id is optional because wallets may report an account before a chain is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub chain_id: Option<ChainId>,
}

impl Session {
    pub fn new(account: Address, chain_id: Option<ChainId>) -> Self {
        Self { account, chain_id }
    }
}
