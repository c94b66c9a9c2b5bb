//! Shared types and pure-logic utilities for the NiftyRent marketplace client.
//! No NEAR SDK and no I/O: amount normalisation, lease/listing/NFT records,
//! reconciliation, and unsigned change-call builders.

pub mod amount;
pub mod calls;
mod context;
pub mod duration;
mod error;
pub mod lease;
pub mod listing;
pub mod nft;
pub mod reconcile;
pub mod token;

pub use amount::{
    TokenAmount, UI_PRECISION, format_amount, from_base_units, parse_to_base_units,
    to_base_units,
};
pub use context::AccountContext;
pub use error::RentalError;
pub use lease::{LeaseCondition, LeaseRecord, LeaseState, NATIVE_NEAR};
pub use listing::{Listing, ListingId};
pub use nft::NftRecord;
pub use reconcile::{
    ContractGroup, ListingView, NftDetail, NftRole, NftSnapshot, ReconciledNftView,
    dedup_by_token, group_by_contract, join_listings, nft_detail, reconcile,
};
pub use token::{FtMetadataView, TokenMetadata, TokenRegistry};
