//! Error types for the client.

use std::fmt;

use niftyrent_types::RentalError;

/// Client error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// RPC communication or contract view error.
    Rpc(String),
    /// NFT index query error.
    Indexer(String),
    /// Response did not match the expected shape.
    Decode(String),
    /// Load abandoned because the active account changed.
    Cancelled,
    /// Amount, token, or view assembly error.
    Rental(RentalError),
}

impl Error {
    /// Collapse into the error a view renders: fetch failures become
    /// `UpstreamFetchFailure`, local errors pass through.
    pub fn into_view_error(self) -> RentalError {
        match self {
            Error::Rental(e) => e,
            other => RentalError::UpstreamFetchFailure(other.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Indexer(msg) => write!(f, "indexer error: {msg}"),
            Error::Decode(msg) => write!(f, "decode error: {msg}"),
            Error::Cancelled => write!(f, "load cancelled: account changed"),
            Error::Rental(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<RentalError> for Error {
    fn from(e: RentalError) -> Self {
        Error::Rental(e)
    }
}
