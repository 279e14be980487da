//! Payout configuration.
use crate::asset::{Asset, NATIVE_SYMBOL};
use alloy::primitives::Address;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Path appended to the backend URL to reach the paymaster proxy.
pub const PAYMASTER_PATH: &str = "paymaster";

/// Payout configuration, injected into [`BatchPayout`](crate::BatchPayout) at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutConfig {
    /// Base URL of the backend hosting the paymaster proxy.
    pub backend_url: Url,
    /// Assets the operator can pay out in.
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

/// An asset the operator can select by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Token contract, or the zero address for the native asset.
    pub address: Address,
    pub symbol: String,
}

impl PayoutConfig {
    pub fn new(backend_url: Url) -> Self {
        Self { backend_url, tokens: Vec::new() }
    }

    /// The paymaster endpoint, `<backend_url>/paymaster`.
    pub fn paymaster_url(&self) -> Url {
        let mut url = self.backend_url.clone();
        let path = format!("{}/{PAYMASTER_PATH}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }

    /// Resolves a configured symbol, case-insensitively. The native symbol always resolves.
    pub fn asset_by_symbol(&self, symbol: &str) -> Option<Asset> {
        self.tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .map(|token| Asset::from(token.address))
            .or_else(|| symbol.eq_ignore_ascii_case(NATIVE_SYMBOL).then_some(Asset::Native))
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}
