//! NFT rows from the off-chain index.

use serde::{Deserialize, Serialize};

/// Snapshot of one indexed NFT. The index may lag behind the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftRecord {
    #[serde(alias = "nft_contract_id")]
    pub contract_id: String,
    pub token_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    pub owner: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "nft_contract_name")]
    pub contract_name: Option<String>,
}

impl NftRecord {
    pub fn token_key(&self) -> (&str, &str) {
        (&self.contract_id, &self.token_id)
    }

    pub fn matches(&self, contract_id: &str, token_id: &str) -> bool {
        self.contract_id == contract_id && self.token_id == token_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_index_row() {
        let nft: NftRecord = serde_json::from_value(json!({
            "owner": "alice.testnet",
            "media": "https://arweave.net/abc",
            "title": "Pet #7",
            "token_id": "7",
            "description": null,
            "minter": "alice.testnet",
            "nft_contract_icon": null,
            "nft_contract_id": "pets.testnet",
            "nft_contract_name": "Pets"
        }))
        .unwrap();
        assert_eq!(nft.token_key(), ("pets.testnet", "7"));
        assert_eq!(nft.title.as_deref(), Some("Pet #7"));
        assert_eq!(nft.description, None);
        assert_eq!(nft.contract_name.as_deref(), Some("Pets"));
        assert!(nft.matches("pets.testnet", "7"));
        assert!(!nft.matches("pets.testnet", "8"));
    }
}
