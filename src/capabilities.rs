//! EIP-5792 capability advertisements and paymaster negotiation.
use alloy::primitives::ChainId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Capability name under which wallets advertise paymaster support.
pub const PAYMASTER_SERVICE: &str = "paymasterService";

/// Capabilities advertised by a wallet, per chain.
///
/// Wallets key chains by hex quantity (`"0x2105"`); decimal keys are accepted as well and keys
/// that are neither are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCapabilities", into = "RawCapabilities")]
pub struct WalletCapabilities(HashMap<ChainId, HashMap<String, Value>>);

/// Capabilities as sent on the wire, keyed by the chain id string.
type RawCapabilities = HashMap<String, HashMap<String, Value>>;

impl WalletCapabilities {
    /// Capabilities of a single chain.
    pub fn chain(&self, chain_id: ChainId) -> Option<&HashMap<String, Value>> {
        self.0.get(&chain_id)
    }

    /// Whether `name` is marked `supported: true` on `chain_id`.
    pub fn supports(&self, chain_id: ChainId, name: &str) -> bool {
        self.chain(chain_id)
            .and_then(|capabilities| capabilities.get(name))
            .and_then(|capability| capability.get("supported"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl From<RawCapabilities> for WalletCapabilities {
    fn from(raw: RawCapabilities) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(key, caps)| Some((parse_chain_id(&key)?, caps)))
                .collect(),
        )
    }
}

impl From<WalletCapabilities> for RawCapabilities {
    fn from(capabilities: WalletCapabilities) -> Self {
        capabilities
            .0
            .into_iter()
            .map(|(chain_id, caps)| (format!("{chain_id:#x}"), caps))
            .collect()
    }
}

fn parse_chain_id(key: &str) -> Option<ChainId> {
    match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(hex) => ChainId::from_str_radix(hex, 16).ok(),
        None => key.parse().ok(),
    }
}

/// Paymaster endpoint attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymasterService {
    pub url: Url,
}

/// Sponsorship capabilities sent along with a batch. Serializes to `{}` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorshipConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_service: Option<PaymasterService>,
}

impl SponsorshipConfig {
    pub fn paymaster(url: Url) -> Self {
        Self { paymaster_service: Some(PaymasterService { url }) }
    }

    pub fn is_empty(&self) -> bool {
        self.paymaster_service.is_none()
    }

    /// Attaches `paymaster_url` if the wallet supports paymasters on `chain_id`.
    ///
    /// Missing capabilities or a missing chain id mean no sponsorship.
    pub fn negotiate(
        capabilities: Option<&WalletCapabilities>,
        chain_id: Option<ChainId>,
        paymaster_url: &Url,
    ) -> Self {
        match (capabilities, chain_id) {
            (Some(capabilities), Some(chain_id))
                if capabilities.supports(chain_id, PAYMASTER_SERVICE) =>
            {
                Self::paymaster(paymaster_url.clone())
            }
            _ => Self::default(),
        }
    }
}
