//! Unsigned change calls, one builder per supported contract method.
//!
//! These only describe the call. Signing and submission belong to the wallet.

use serde::Serialize;
use serde_json::{Value, json};

use crate::amount::{TokenAmount, to_base_units};
use crate::error::RentalError;
use crate::listing::Listing;
use crate::token::TokenMetadata;

pub const TGAS: u64 = 1_000_000_000_000;
/// Gas attached to every marketplace call.
pub const CALL_GAS: u64 = 300 * TGAS;

pub const ONE_YOCTO: TokenAmount = TokenAmount(1);
/// Added to the rent when accepting a lease (10^18 yoctoNEAR, one microNEAR).
pub const ACCEPT_DEPOSIT_MARGIN: TokenAmount = TokenAmount(1_000_000_000_000_000_000);
/// Storage deposit for `nft_approve` (0.001 NEAR).
pub const APPROVAL_DEPOSIT: TokenAmount = TokenAmount(1_000_000_000_000_000_000_000);

/// A function call ready to hand to a wallet for signing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub receiver_id: String,
    pub method_name: &'static str,
    pub args: Value,
    pub gas: u64,
    /// Attached NEAR in yoctoNEAR.
    pub deposit: TokenAmount,
}

/// Lender reclaims an NFT from an expired lease.
pub fn claim_back(rental_contract_id: &str, lease_id: &str) -> FunctionCall {
    FunctionCall {
        receiver_id: rental_contract_id.to_string(),
        method_name: "claim_back",
        args: json!({ "lease_id": lease_id }),
        gas: CALL_GAS,
        deposit: ONE_YOCTO,
    }
}

/// Borrower accepts a NEAR-priced lease, paying the rent plus a one-microNEAR margin.
pub fn lending_accept(
    contract_id: &str,
    lease_id: &str,
    rent: TokenAmount,
) -> Result<FunctionCall, RentalError> {
    let deposit = rent
        .checked_add(ACCEPT_DEPOSIT_MARGIN)
        .ok_or(RentalError::AmountOverflow)?;
    Ok(FunctionCall {
        receiver_id: contract_id.to_string(),
        method_name: "lending_accept",
        args: json!({ "lease_id": lease_id }),
        gas: CALL_GAS,
        deposit,
    })
}

/// Borrower pays a listing's rent in its FT via `ft_transfer_call`.
pub fn accept_listing(marketplace_contract_id: &str, listing: &Listing) -> FunctionCall {
    let msg = json!({
        "nft_contract_id": listing.nft_contract_id,
        "nft_token_id": listing.nft_token_id,
    });
    FunctionCall {
        receiver_id: listing.ft_contract_id.clone(),
        method_name: "ft_transfer_call",
        args: json!({
            "receiver_id": marketplace_contract_id,
            "amount": listing.price,
            "msg": msg.to_string(),
        }),
        gas: CALL_GAS,
        deposit: ONE_YOCTO,
    }
}

/// Terms a lender enters for a new listing.
#[derive(Debug, Clone)]
pub struct ListingTerms<'a> {
    pub token_id: &'a str,
    pub ft: &'a TokenMetadata,
    /// Rent in UI units of `ft`.
    pub rent: f64,
    pub lease_start_ts_nano: u64,
    pub lease_end_ts_nano: u64,
}

/// Lender lists an NFT by approving the marketplace with the terms as `msg`.
pub fn new_listing(
    nft_contract_id: &str,
    marketplace_contract_id: &str,
    terms: &ListingTerms<'_>,
) -> Result<FunctionCall, RentalError> {
    if terms.lease_start_ts_nano >= terms.lease_end_ts_nano {
        return Err(RentalError::InvalidListing(
            "lease end time must be later than the start time".into(),
        ));
    }
    if !(terms.rent > 0.0) {
        return Err(RentalError::InvalidListing(
            "rent must be a positive number".into(),
        ));
    }
    let price = to_base_units(terms.ft, terms.rent)?;
    let msg = json!({
        "ft_contract_id": terms.ft.contract_address,
        "price": price,
        "lease_start_ts_nano": terms.lease_start_ts_nano.to_string(),
        "lease_end_ts_nano": terms.lease_end_ts_nano.to_string(),
    });
    Ok(FunctionCall {
        receiver_id: nft_contract_id.to_string(),
        method_name: "nft_approve",
        args: json!({
            "token_id": terms.token_id,
            "account_id": marketplace_contract_id,
            "msg": msg.to_string(),
        }),
        gas: CALL_GAS,
        deposit: APPROVAL_DEPOSIT,
    })
}
