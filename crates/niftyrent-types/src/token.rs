//! Fungible-token metadata and the per-session registry of allowed tokens.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RentalError;

/// NEP-148 `ft_metadata` view result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtMetadataView {
    pub spec: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub reference_hash: Option<String>,
    pub decimals: u8,
}

/// What the client needs to know about a payment token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub decimals: u8,
    pub symbol: String,
    pub contract_address: String,
}

impl TokenMetadata {
    pub fn new(contract_address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            decimals,
            symbol: symbol.into(),
            contract_address: contract_address.into(),
        }
    }

    /// NEAR itself, for leases priced in the native token.
    pub fn native_near() -> Self {
        Self::new(crate::lease::NATIVE_NEAR, "NEAR", 24)
    }

    pub fn from_view(contract_address: impl Into<String>, view: FtMetadataView) -> Self {
        Self::new(contract_address, view.symbol, view.decimals)
    }
}

/// Token metadata cached by contract address. Only allowed tokens are inserted.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenMetadata>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metadata: TokenMetadata) {
        self.tokens
            .insert(metadata.contract_address.clone(), metadata);
    }

    pub fn metadata_of(&self, contract_address: &str) -> Result<&TokenMetadata, RentalError> {
        self.tokens
            .get(contract_address)
            .ok_or_else(|| RentalError::UnknownToken(contract_address.to_string()))
    }

    pub fn symbol_of(&self, contract_address: &str) -> Result<&str, RentalError> {
        self.metadata_of(contract_address).map(|m| m.symbol.as_str())
    }

    pub fn contains(&self, contract_address: &str) -> bool {
        self.tokens.contains_key(contract_address)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Allowed tokens sorted by contract address.
    pub fn tokens(&self) -> Vec<&TokenMetadata> {
        let mut all: Vec<&TokenMetadata> = self.tokens.values().collect();
        all.sort_by(|a, b| a.contract_address.cmp(&b.contract_address));
        all
    }
}

impl FromIterator<TokenMetadata> for TokenRegistry {
    fn from_iter<I: IntoIterator<Item = TokenMetadata>>(iter: I) -> Self {
        let mut registry = Self::new();
        for metadata in iter {
            registry.insert(metadata);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> TokenRegistry {
        [
            TokenMetadata::new("wrap.testnet", "wNEAR", 24),
            TokenMetadata::new("usdc.fakes.testnet", "USDC.e", 6),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_symbol_lookup() {
        let registry = registry();
        assert_eq!(registry.symbol_of("wrap.testnet").unwrap(), "wNEAR");
        assert_eq!(registry.metadata_of("usdc.fakes.testnet").unwrap().decimals, 6);
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(
            registry().symbol_of("evil.testnet"),
            Err(RentalError::UnknownToken("evil.testnet".into()))
        );
    }

    #[test]
    fn test_tokens_sorted() {
        let registry = registry();
        let addrs: Vec<&str> = registry
            .tokens()
            .iter()
            .map(|t| t.contract_address.as_str())
            .collect();
        assert_eq!(addrs, vec!["usdc.fakes.testnet", "wrap.testnet"]);
    }

    #[test]
    fn test_from_ft_metadata_view() {
        let view: FtMetadataView = serde_json::from_value(json!({
            "spec": "ft-1.0.0",
            "name": "Wrapped NEAR fungible token",
            "symbol": "wNEAR",
            "icon": null,
            "reference": null,
            "reference_hash": null,
            "decimals": 24
        }))
        .unwrap();
        let metadata = TokenMetadata::from_view("wrap.testnet", view);
        assert_eq!(metadata, TokenMetadata::new("wrap.testnet", "wNEAR", 24));
    }

    #[test]
    fn test_native_near_metadata() {
        let near = TokenMetadata::native_near();
        assert_eq!(near.contract_address, crate::lease::NATIVE_NEAR);
        assert_eq!(near.decimals, 24);
        assert_eq!(near.symbol, "NEAR");
    }
}
