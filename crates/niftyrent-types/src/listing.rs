//! Marketplace listings offered for rent.

use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;

/// A listing is keyed by the NFT it offers; serialized as `[contract, token]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String, pub String);

impl ListingId {
    pub fn new(nft_contract_id: impl Into<String>, nft_token_id: impl Into<String>) -> Self {
        Self(nft_contract_id.into(), nft_token_id.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub owner_id: String,
    /// Approval for moving the NFT into the rental contract's custody.
    pub approval_id: u64,
    pub nft_contract_id: String,
    pub nft_token_id: String,
    pub ft_contract_id: String,
    pub price: TokenAmount,
    #[serde(alias = "lease_start_time")]
    pub lease_start_ts_nano: u64,
    #[serde(alias = "lease_end_time")]
    pub lease_end_ts_nano: u64,
}

impl Listing {
    pub fn id(&self) -> ListingId {
        ListingId::new(&self.nft_contract_id, &self.nft_token_id)
    }

    pub fn token_key(&self) -> (&str, &str) {
        (&self.nft_contract_id, &self.nft_token_id)
    }

    pub fn lease_duration_ns(&self) -> u64 {
        self.lease_end_ts_nano.saturating_sub(self.lease_start_ts_nano)
    }
}
