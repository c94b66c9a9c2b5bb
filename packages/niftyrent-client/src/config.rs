//! Client configuration.

use serde::Deserialize;

/// Configuration for the NiftyRent client.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::network")]
    pub network: String,

    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default = "defaults::fallback_rpc_url")]
    pub fallback_rpc_url: String,

    #[serde(default = "defaults::marketplace_contract_id")]
    pub marketplace_contract_id: String,

    /// Empty means: ask the marketplace via `get_rental_contract_id`.
    #[serde(default)]
    pub rental_contract_id: String,

    #[serde(default = "defaults::indexer_url")]
    pub indexer_url: String,

    /// Account whose NFTs are loaded. Empty for a signed-out session.
    #[serde(default)]
    pub account_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: defaults::network(),
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: defaults::fallback_rpc_url(),
            marketplace_contract_id: defaults::marketplace_contract_id(),
            rental_contract_id: String::new(),
            indexer_url: defaults::indexer_url(),
            account_id: String::new(),
        }
    }
}

impl Config {
    pub fn is_mainnet(&self) -> bool {
        self.network.contains("mainnet")
    }

    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.marketplace_contract_id.is_empty() {
            return Err(crate::Error::Config(
                "marketplace_contract_id must be set".into(),
            ));
        }
        if self.rpc_url.is_empty() || self.indexer_url.is_empty() {
            return Err(crate::Error::Config(
                "rpc_url and indexer_url must be set".into(),
            ));
        }
        Ok(())
    }
}

mod defaults {
    fn env_network() -> String {
        std::env::var("NIFTYRENT_NETWORK")
            .or_else(|_| std::env::var("NEAR_NETWORK"))
            .unwrap_or_else(|_| "testnet".into())
    }

    pub fn network() -> String {
        env_network()
    }

    pub fn rpc_url() -> String {
        if env_network().contains("mainnet") {
            "https://rpc.mainnet.near.org".into()
        } else {
            "https://rpc.testnet.near.org".into()
        }
    }

    pub fn fallback_rpc_url() -> String {
        if env_network().contains("mainnet") {
            "https://free.rpc.fastnear.com".into()
        } else {
            "https://test.rpc.fastnear.com".into()
        }
    }

    pub fn marketplace_contract_id() -> String {
        "market.niftyrent.testnet".into()
    }

    pub fn indexer_url() -> String {
        if env_network().contains("mainnet") {
            "https://graph.mintbase.xyz/mainnet".into()
        } else {
            "https://graph.mintbase.xyz/testnet".into()
        }
    }
}
