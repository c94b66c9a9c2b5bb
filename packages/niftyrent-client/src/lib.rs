//! # NiftyRent client
//!
//! Read side of the NiftyRent NFT rental marketplace. Fetches leases and
//! listings from the NEAR contracts and NFT metadata from the off-chain
//! index, then reconciles them into display-ready views.
//!
//! ## Quick Start
//! ```bash
//! NIFTYRENT_ACCOUNT_ID=alice.testnet cargo run --bin niftyrent
//! ```

pub mod config;
pub mod contracts;
mod error;
pub mod indexer;
pub mod loader;
pub mod rpc;
pub mod session;

pub use config::Config;
pub use contracts::{ChainView, NearContracts};
pub use error::Error;
pub use indexer::{IndexerClient, NftIndex};
pub use session::{Scope, Session};
