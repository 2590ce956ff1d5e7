//! Chain aliases and the ecosystems that share normalization/comparison rules.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Identifier of a blockchain, e.g. `eth`, `polygon`, `solana`, `bitcoin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainAlias(String);

impl ChainAlias {
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Family of chains sharing a protocol and address/hash normalization rules.
    pub fn ecosystem(&self) -> Ecosystem {
        match self.0.as_str() {
            "eth" | "polygon" | "arbitrum" | "optimism" | "base" | "bnb" | "avalanche" => {
                Ecosystem::Evm
            }
            "solana" => Ecosystem::Svm,
            "bitcoin" | "litecoin" => Ecosystem::Utxo,
            "ton" => Ecosystem::Tvm,
            "xrp" => Ecosystem::Xrp,
            "polkadot" | "kusama" => Ecosystem::Substrate,
            _ => Ecosystem::Evm,
        }
    }
}

impl fmt::Display for ChainAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainAlias {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChainAlias {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Family of chain aliases sharing a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Evm,
    Svm,
    Utxo,
    Tvm,
    Xrp,
    Substrate,
}

/// Normalizes an address or transaction hash the way this chain's ecosystem compares them.
///
/// EVM addresses and hashes are compared lowercase; every other ecosystem is
/// compared in its raw, case-sensitive form.
pub fn normalize(ecosystem: Ecosystem, value: &str) -> String {
    match ecosystem {
        Ecosystem::Evm => value.to_ascii_lowercase(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn evm_addresses_normalize_lowercase() {
        let chain = ChainAlias::new("eth");
        assert_eq!(
            normalize(chain.ecosystem(), "0xABC123"),
            "0xabc123".to_string()
        );
    }

    #[test]
    fn utxo_addresses_keep_raw_case() {
        let chain = ChainAlias::new("bitcoin");
        assert_eq!(normalize(chain.ecosystem(), "BC1QXYZ"), "BC1QXYZ");
    }

    #[test]
    fn unknown_alias_defaults_to_evm_family() {
        assert_eq!(ChainAlias::new("sepolia").ecosystem(), Ecosystem::Evm);
    }
}
