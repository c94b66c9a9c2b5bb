//! View loaders: fetch from chain and index, then assemble display data.
//!
//! Independent queries run concurrently. Any failed fetch fails the whole
//! view; nothing is retried.

use std::collections::{BTreeMap, BTreeSet};

use niftyrent_types::{
    AccountContext, LeaseRecord, ListingId, ListingView, NftDetail, NftRecord, NftSnapshot,
    ReconciledNftView, TokenRegistry, join_listings, nft_detail, reconcile,
};
use tracing::info;

use crate::contracts::ChainView;
use crate::indexer::NftIndex;

/// The account's own NFTs plus the ones it lends out or borrows.
pub async fn load_my_nfts<C: ChainView, I: NftIndex>(
    ctx: &AccountContext,
    chain: &C,
    index: &I,
) -> Result<Vec<ReconciledNftView>, crate::Error> {
    if !ctx.is_signed_in() {
        return Ok(Vec::new());
    }

    let (user_owned, lendings, borrowings) = tokio::try_join!(
        index.tokens_by_owner(&ctx.account_id),
        chain.leases_by_owner(&ctx.account_id),
        chain.leases_by_borrower(&ctx.account_id),
    )?;
    let escrow_held = load_leased_tokens(index, &lendings, &borrowings).await?;

    info!(
        account = %ctx.account_id,
        owned = user_owned.len(),
        lendings = lendings.len(),
        borrowings = borrowings.len(),
        escrow = escrow_held.len(),
        "Loaded NFT snapshot"
    );

    Ok(reconcile(
        ctx,
        NftSnapshot {
            user_owned,
            lendings,
            borrowings,
            escrow_held,
        },
    ))
}

/// Index records of the leased tokens, one query per NFT contract.
async fn load_leased_tokens<I: NftIndex>(
    index: &I,
    lendings: &[LeaseRecord],
    borrowings: &[LeaseRecord],
) -> Result<Vec<NftRecord>, crate::Error> {
    let mut by_contract: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for lease in lendings.iter().chain(borrowings) {
        by_contract
            .entry(lease.contract_addr.as_str())
            .or_default()
            .insert(lease.token_id.as_str());
    }

    let mut records = Vec::new();
    for (nft_contract_id, token_ids) in by_contract {
        let token_ids: Vec<String> = token_ids.into_iter().map(str::to_string).collect();
        records.extend(index.tokens_by_ids(nft_contract_id, &token_ids).await?);
    }
    Ok(records)
}

/// Leases the account has lent out.
pub async fn load_lendings<C: ChainView>(
    ctx: &AccountContext,
    chain: &C,
) -> Result<Vec<LeaseRecord>, crate::Error> {
    if !ctx.is_signed_in() {
        return Ok(Vec::new());
    }
    chain.leases_by_owner(&ctx.account_id).await
}

/// Leases the account is borrowing.
pub async fn load_borrowings<C: ChainView>(
    ctx: &AccountContext,
    chain: &C,
) -> Result<Vec<LeaseRecord>, crate::Error> {
    if !ctx.is_signed_in() {
        return Ok(Vec::new());
    }
    chain.leases_by_borrower(&ctx.account_id).await
}

/// Listings of one NFT contract with their indexed metadata.
pub async fn load_shop<C: ChainView, I: NftIndex>(
    chain: &C,
    index: &I,
    nft_contract_id: &str,
) -> Result<Vec<ListingView>, crate::Error> {
    let listings = chain.list_listings_by_nft_contract_id(nft_contract_id).await?;
    let token_ids: Vec<String> = listings
        .iter()
        .filter(|l| l.nft_contract_id == nft_contract_id)
        .map(|l| l.nft_token_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let nfts = index.tokens_by_ids(nft_contract_id, &token_ids).await?;
    Ok(join_listings(listings, &nfts))
}

/// One listing with its NFT, if it is listed and indexed.
pub async fn load_listing<C: ChainView, I: NftIndex>(
    chain: &C,
    index: &I,
    nft_contract_id: &str,
    token_id: &str,
) -> Result<Option<ListingView>, crate::Error> {
    let id = ListingId::new(nft_contract_id, token_id);
    let (listing, nfts) = tokio::try_join!(
        chain.get_listing_by_id(&id),
        index.token(nft_contract_id, token_id),
    )?;
    Ok(listing.and_then(|l| join_listings(vec![l], &nfts).pop()))
}

/// Detail page data: the NFT and its current lease.
pub async fn load_nft_detail<C: ChainView, I: NftIndex>(
    chain: &C,
    index: &I,
    nft_contract_id: &str,
    token_id: &str,
) -> Result<NftDetail, crate::Error> {
    let (nfts, lease) = tokio::try_join!(
        index.token(nft_contract_id, token_id),
        chain.lease_by_contract_and_token(nft_contract_id, token_id),
    )?;
    Ok(nft_detail(nft_contract_id, token_id, nfts, lease)?)
}

/// Metadata of every FT the marketplace accepts for rent.
pub async fn load_token_registry<C: ChainView>(chain: &C) -> Result<TokenRegistry, crate::Error> {
    let addrs = chain.list_allowed_ft_contract_ids().await?;
    let mut registry = TokenRegistry::new();
    for addr in &addrs {
        registry.insert(chain.ft_metadata(addr).await?);
    }
    info!(tokens = registry.len(), "Loaded allowed FTs");
    Ok(registry)
}
