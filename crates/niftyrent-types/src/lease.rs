//! Lease records as returned by the rental contract.

use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;

/// On-chain lease lifecycle. Expiry of an active lease is derived from time,
/// not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaseState {
    Pending,
    Active,
    Expired,
}

/// Pseudo contract address for leases priced in native NEAR.
pub const NATIVE_NEAR: &str = "near";

/// Lease body as stored by the rental contract.
///
/// Also decodes the first rental contract's shape, which names the parties
/// `owner_id`/`borrower`, ends at `expiration` and prices the lease in NEAR
/// as a bare JSON number under `amount_near`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LeaseConditionWire")]
pub struct LeaseCondition {
    pub contract_addr: String,
    pub token_id: String,
    pub lender_id: String,
    pub borrower_id: String,
    pub approval_id: Option<u64>,
    pub start_ts_nano: u64,
    pub end_ts_nano: u64,
    pub price: TokenAmount,
    pub ft_contract_addr: String,
    pub state: LeaseState,
}

#[derive(Deserialize)]
struct LeaseConditionWire {
    contract_addr: String,
    token_id: String,
    #[serde(alias = "owner_id")]
    lender_id: String,
    #[serde(alias = "borrower")]
    borrower_id: String,
    #[serde(default)]
    approval_id: Option<u64>,
    #[serde(default)]
    start_ts_nano: u64,
    #[serde(alias = "expiration")]
    end_ts_nano: u64,
    #[serde(default)]
    price: Option<TokenAmount>,
    #[serde(default)]
    amount_near: Option<u128>,
    #[serde(default)]
    ft_contract_addr: Option<String>,
    state: LeaseState,
}

impl TryFrom<LeaseConditionWire> for LeaseCondition {
    type Error = String;

    fn try_from(wire: LeaseConditionWire) -> Result<Self, Self::Error> {
        let (price, ft_contract_addr) = match (wire.price, wire.amount_near) {
            (Some(price), _) => (
                price,
                wire.ft_contract_addr
                    .ok_or_else(|| "missing field `ft_contract_addr`".to_string())?,
            ),
            (None, Some(amount_near)) => (
                TokenAmount(amount_near),
                wire.ft_contract_addr
                    .unwrap_or_else(|| NATIVE_NEAR.to_string()),
            ),
            (None, None) => return Err("missing field `price`".to_string()),
        };
        Ok(Self {
            contract_addr: wire.contract_addr,
            token_id: wire.token_id,
            lender_id: wire.lender_id,
            borrower_id: wire.borrower_id,
            approval_id: wire.approval_id,
            start_ts_nano: wire.start_ts_nano,
            end_ts_nano: wire.end_ts_nano,
            price,
            ft_contract_addr,
            state: wire.state,
        })
    }
}

/// A lease with its id, flattened from the contract's `(id, lease)` tuples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub lease_id: String,
    pub contract_addr: String,
    pub token_id: String,
    pub lender_id: String,
    pub borrower_id: String,
    pub start_ts_nano: u64,
    pub end_ts_nano: u64,
    pub price: TokenAmount,
    pub ft_contract_addr: String,
    pub state: LeaseState,
}

impl LeaseRecord {
    pub fn new(lease_id: impl Into<String>, lease: LeaseCondition) -> Self {
        Self {
            lease_id: lease_id.into(),
            contract_addr: lease.contract_addr,
            token_id: lease.token_id,
            lender_id: lease.lender_id,
            borrower_id: lease.borrower_id,
            start_ts_nano: lease.start_ts_nano,
            end_ts_nano: lease.end_ts_nano,
            price: lease.price,
            ft_contract_addr: lease.ft_contract_addr,
            state: lease.state,
        }
    }

    /// `(contract, token)` key shared with NFT and listing records.
    pub fn token_key(&self) -> (&str, &str) {
        (&self.contract_addr, &self.token_id)
    }

    pub fn is_expired(&self, now_ns: u64) -> bool {
        self.end_ts_nano < now_ns
    }

    /// Lender may claim the NFT back: lease active and past its end.
    pub fn is_claimable(&self, now_ns: u64) -> bool {
        self.state == LeaseState::Active && self.is_expired(now_ns)
    }

    pub fn duration_ns(&self) -> u64 {
        self.end_ts_nano.saturating_sub(self.start_ts_nano)
    }

    pub fn remaining_ns(&self, now_ns: u64) -> u64 {
        self.end_ts_nano.saturating_sub(now_ns)
    }
}

impl From<(String, LeaseCondition)> for LeaseRecord {
    fn from((lease_id, lease): (String, LeaseCondition)) -> Self {
        Self::new(lease_id, lease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lease(state: LeaseState, end: u64) -> LeaseRecord {
        LeaseRecord {
            lease_id: "lease-1".into(),
            contract_addr: "nft.testnet".into(),
            token_id: "7".into(),
            lender_id: "alice.testnet".into(),
            borrower_id: "bob.testnet".into(),
            start_ts_nano: 100,
            end_ts_nano: end,
            price: TokenAmount(10),
            ft_contract_addr: "wrap.testnet".into(),
            state,
        }
    }

    #[test]
    fn test_decode_contract_tuple() {
        let entries: Vec<(String, LeaseCondition)> = serde_json::from_value(json!([[
            "8Vf3",
            {
                "contract_addr": "nft.testnet",
                "token_id": "7",
                "lender_id": "alice.testnet",
                "borrower_id": "bob.testnet",
                "approval_id": 3,
                "start_ts_nano": 1_000,
                "end_ts_nano": 2_000,
                "price": "1500000000000000000000000",
                "ft_contract_addr": "wrap.testnet",
                "state": "Active"
            }
        ]]))
        .unwrap();
        let records: Vec<LeaseRecord> = entries.into_iter().map(LeaseRecord::from).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lease_id, "8Vf3");
        assert_eq!(records[0].token_key(), ("nft.testnet", "7"));
        assert_eq!(records[0].price, TokenAmount(1_500 * 10u128.pow(21)));
        assert_eq!(records[0].state, LeaseState::Active);
    }

    #[test]
    fn test_decode_first_contract_shape() {
        let raw = r#"[["id1",{
            "contract_addr": "nft.testnet",
            "token_id": "1",
            "owner_id": "alice.testnet",
            "borrower": "bob.testnet",
            "approval_id": 0,
            "expiration": 5000,
            "amount_near": 1000000000000000000000000,
            "state": "Active"
        }]]"#;
        let entries: Vec<(String, LeaseCondition)> = serde_json::from_str(raw).unwrap();
        let record = LeaseRecord::from(entries.into_iter().next().unwrap());
        assert_eq!(record.lease_id, "id1");
        assert_eq!(record.lender_id, "alice.testnet");
        assert_eq!(record.borrower_id, "bob.testnet");
        assert_eq!(record.start_ts_nano, 0);
        assert_eq!(record.end_ts_nano, 5_000);
        assert_eq!(record.price, TokenAmount(10u128.pow(24)));
        assert_eq!(record.ft_contract_addr, NATIVE_NEAR);
        assert_eq!(record.state, LeaseState::Active);
    }

    #[test]
    fn test_decode_rejects_lease_without_price() {
        let err = serde_json::from_value::<LeaseCondition>(json!({
            "contract_addr": "nft.testnet",
            "token_id": "1",
            "lender_id": "alice.testnet",
            "borrower_id": "bob.testnet",
            "end_ts_nano": 5_000,
            "ft_contract_addr": "wrap.testnet",
            "state": "Pending"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_claimable_after_end() {
        let t0 = 2_000;
        let active = lease(LeaseState::Active, t0);
        assert!(active.is_claimable(t0 + 1));
        assert!(!active.is_claimable(t0));
        assert!(!lease(LeaseState::Pending, t0).is_claimable(t0 + 1));
        assert!(!lease(LeaseState::Expired, t0).is_claimable(t0 + 1));
    }

    #[test]
    fn test_durations() {
        let l = lease(LeaseState::Active, 1_100);
        assert_eq!(l.duration_ns(), 1_000);
        assert_eq!(l.remaining_ns(600), 500);
        assert_eq!(l.remaining_ns(5_000), 0);
    }
}
