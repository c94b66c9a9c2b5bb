/// Errors raised by amount conversion, token lookup, and view assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalError {
    /// Token decimals below the 3 digits reserved for UI precision.
    InvalidPrecision { decimals: u8 },
    InvalidAmount(String),
    AmountOverflow,
    /// Contract address outside the allowed FT set.
    UnknownToken(String),
    MissingNft { contract_id: String, token_id: String },
    /// Listing terms rejected before building the approval call.
    InvalidListing(String),
    /// Query or transaction call failed upstream.
    UpstreamFetchFailure(String),
}

impl std::fmt::Display for RentalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrecision { decimals } => {
                write!(f, "invalid precision: token has {decimals} decimals, need at least 3")
            }
            Self::InvalidAmount(msg) => write!(f, "invalid amount: {msg}"),
            Self::AmountOverflow => write!(f, "amount overflows base-unit range"),
            Self::UnknownToken(addr) => write!(f, "unknown token: {addr}"),
            Self::MissingNft {
                contract_id,
                token_id,
            } => write!(f, "NFT info not found: {contract_id}/{token_id}"),
            Self::InvalidListing(msg) => write!(f, "invalid listing: {msg}"),
            Self::UpstreamFetchFailure(msg) => write!(f, "upstream fetch failed: {msg}"),
        }
    }
}

impl std::error::Error for RentalError {}
