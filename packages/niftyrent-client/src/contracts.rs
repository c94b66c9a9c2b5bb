//! Typed view calls against the marketplace, rental, and FT contracts.

use niftyrent_types::{
    FtMetadataView, LeaseCondition, LeaseRecord, Listing, ListingId, TokenMetadata,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::rpc::RpcClient;

/// One method per supported on-chain view call.
#[allow(async_fn_in_trait)]
pub trait ChainView {
    /// Leases where `account_id` is the lender.
    async fn leases_by_owner(&self, account_id: &str) -> Result<Vec<LeaseRecord>, crate::Error>;

    /// Leases where `account_id` is the borrower.
    async fn leases_by_borrower(&self, account_id: &str)
        -> Result<Vec<LeaseRecord>, crate::Error>;

    async fn lease_by_contract_and_token(
        &self,
        contract_id: &str,
        token_id: &str,
    ) -> Result<Option<LeaseRecord>, crate::Error>;

    async fn get_rental_contract_id(&self) -> Result<String, crate::Error>;

    async fn list_allowed_ft_contract_ids(&self) -> Result<Vec<String>, crate::Error>;

    async fn list_allowed_nft_contract_ids(&self) -> Result<Vec<String>, crate::Error>;

    async fn list_listings_by_nft_contract_id(
        &self,
        nft_contract_id: &str,
    ) -> Result<Vec<Listing>, crate::Error>;

    async fn get_listing_by_id(&self, listing_id: &ListingId)
        -> Result<Option<Listing>, crate::Error>;

    async fn ft_metadata(&self, ft_contract_id: &str) -> Result<TokenMetadata, crate::Error>;
}

#[derive(Serialize)]
struct AccountArgs<'a> {
    account_id: &'a str,
}

#[derive(Serialize)]
struct TokenArgs<'a> {
    contract_id: &'a str,
    token_id: &'a str,
}

#[derive(Serialize)]
struct NftContractArgs<'a> {
    nft_contract_id: &'a str,
}

#[derive(Serialize)]
struct ListingIdArgs<'a> {
    listing_id: &'a ListingId,
}

/// [`ChainView`] over NEAR JSON-RPC.
pub struct NearContracts {
    rpc: RpcClient,
    marketplace_contract_id: String,
    rental_contract_id: String,
}

impl NearContracts {
    pub fn new(
        rpc: RpcClient,
        marketplace_contract_id: impl Into<String>,
        rental_contract_id: impl Into<String>,
    ) -> Self {
        Self {
            rpc,
            marketplace_contract_id: marketplace_contract_id.into(),
            rental_contract_id: rental_contract_id.into(),
        }
    }

    /// Build from config, asking the marketplace for the rental contract
    /// when the config leaves it empty.
    pub async fn connect(config: &Config) -> Result<Self, crate::Error> {
        config.validate()?;
        let rpc = RpcClient::new(&config.rpc_url, &config.fallback_rpc_url);
        let mut contracts = Self::new(rpc, &config.marketplace_contract_id, &config.rental_contract_id);
        if contracts.rental_contract_id.is_empty() {
            contracts.rental_contract_id = contracts.get_rental_contract_id().await?;
            info!(rental = %contracts.rental_contract_id, "Resolved rental contract from marketplace");
        }
        Ok(contracts)
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn marketplace_contract_id(&self) -> &str {
        &self.marketplace_contract_id
    }

    pub fn rental_contract_id(&self) -> &str {
        &self.rental_contract_id
    }

    async fn leases(&self, method: &str, account_id: &str) -> Result<Vec<LeaseRecord>, crate::Error> {
        let entries: Vec<(String, LeaseCondition)> = self
            .rpc
            .view_json(&self.rental_contract_id, method, &AccountArgs { account_id })
            .await?;
        Ok(entries.into_iter().map(LeaseRecord::from).collect())
    }
}

impl ChainView for NearContracts {
    async fn leases_by_owner(&self, account_id: &str) -> Result<Vec<LeaseRecord>, crate::Error> {
        self.leases("leases_by_owner", account_id).await
    }

    async fn leases_by_borrower(
        &self,
        account_id: &str,
    ) -> Result<Vec<LeaseRecord>, crate::Error> {
        self.leases("leases_by_borrower", account_id).await
    }

    async fn lease_by_contract_and_token(
        &self,
        contract_id: &str,
        token_id: &str,
    ) -> Result<Option<LeaseRecord>, crate::Error> {
        let entry: Option<(String, LeaseCondition)> = self
            .rpc
            .view_json(
                &self.rental_contract_id,
                "lease_by_contract_and_token",
                &TokenArgs {
                    contract_id,
                    token_id,
                },
            )
            .await?;
        Ok(entry.map(LeaseRecord::from))
    }

    async fn get_rental_contract_id(&self) -> Result<String, crate::Error> {
        self.rpc
            .view_json(&self.marketplace_contract_id, "get_rental_contract_id", &json!({}))
            .await
    }

    async fn list_allowed_ft_contract_ids(&self) -> Result<Vec<String>, crate::Error> {
        self.rpc
            .view_json(&self.marketplace_contract_id, "list_allowed_ft_contract_ids", &json!({}))
            .await
    }

    async fn list_allowed_nft_contract_ids(&self) -> Result<Vec<String>, crate::Error> {
        self.rpc
            .view_json(&self.marketplace_contract_id, "list_allowed_nft_contract_ids", &json!({}))
            .await
    }

    async fn list_listings_by_nft_contract_id(
        &self,
        nft_contract_id: &str,
    ) -> Result<Vec<Listing>, crate::Error> {
        self.rpc
            .view_json(
                &self.marketplace_contract_id,
                "list_listings_by_nft_contract_id",
                &NftContractArgs { nft_contract_id },
            )
            .await
    }

    async fn get_listing_by_id(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<Listing>, crate::Error> {
        self.rpc
            .view_json(
                &self.marketplace_contract_id,
                "get_listing_by_id",
                &ListingIdArgs { listing_id },
            )
            .await
    }

    async fn ft_metadata(&self, ft_contract_id: &str) -> Result<TokenMetadata, crate::Error> {
        let view: FtMetadataView = self
            .rpc
            .view_json(ft_contract_id, "ft_metadata", &json!({}))
            .await?;
        Ok(TokenMetadata::from_view(ft_contract_id, view))
    }
}
