use serde::{Deserialize, Serialize};

/// Who is looking, and at which deployment. Passed explicitly into every
/// load and reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    pub account_id: String,
    /// Escrow account holding NFTs for the duration of a lease.
    pub rental_contract_id: String,
    pub marketplace_contract_id: String,
}

impl AccountContext {
    pub fn new(
        account_id: impl Into<String>,
        rental_contract_id: impl Into<String>,
        marketplace_contract_id: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            rental_contract_id: rental_contract_id.into(),
            marketplace_contract_id: marketplace_contract_id.into(),
        }
    }

    /// Signed-out sessions carry an empty account id.
    pub fn is_signed_in(&self) -> bool {
        !self.account_id.is_empty()
    }
}
