//! Joins on-chain lease state with indexed NFT metadata into display lists.
//!
//! Chain and index are not transactionally consistent: a lease whose NFT is
//! not (yet) visible in the index is dropped from the view, never an error.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::context::AccountContext;
use crate::error::RentalError;
use crate::lease::LeaseRecord;
use crate::listing::Listing;
use crate::nft::NftRecord;

/// Relation of the current account to a displayed NFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NftRole {
    Owned,
    Lending,
    Borrowing,
}

/// Inputs of one reconciliation pass, all fetched for the same account.
#[derive(Debug, Clone, Default)]
pub struct NftSnapshot {
    pub user_owned: Vec<NftRecord>,
    /// Leases where the account is lender.
    pub lendings: Vec<LeaseRecord>,
    /// Leases where the account is borrower.
    pub borrowings: Vec<LeaseRecord>,
    /// Index rows for the leased tokens, normally owned by the escrow.
    pub escrow_held: Vec<NftRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledNftView {
    pub nft: NftRecord,
    pub lease: Option<LeaseRecord>,
    pub role: NftRole,
}

impl ReconciledNftView {
    pub fn owned(nft: NftRecord) -> Self {
        Self {
            nft,
            lease: None,
            role: NftRole::Owned,
        }
    }

    pub fn is_lending(&self) -> bool {
        self.role == NftRole::Lending
    }

    pub fn is_borrowing(&self) -> bool {
        self.role == NftRole::Borrowing
    }

    /// Lender can claim the NFT back once the lease end has passed.
    pub fn is_claimable(&self, now_ns: u64) -> bool {
        self.is_lending()
            && self
                .lease
                .as_ref()
                .is_some_and(|lease| lease.end_ts_nano < now_ns)
    }

    /// Display-only countdown flag; no on-chain meaning.
    pub fn is_expiring(&self, now_ns: u64) -> bool {
        self.lease
            .as_ref()
            .is_some_and(|lease| lease.end_ts_nano > now_ns)
    }

    /// The index reports the rental contract as the current holder.
    pub fn in_escrow(&self, rental_contract_id: &str) -> bool {
        self.nft.owner == rental_contract_id
    }
}

/// NFTs of one contract, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractGroup {
    pub contract_id: String,
    pub contract_name: Option<String>,
    pub items: Vec<ReconciledNftView>,
}

/// Owned NFTs first, then lent and borrowed NFTs found in escrow.
///
/// Duplicates between the owned set and leased matches are kept; see
/// [`dedup_by_token`] for callers that want one entry per token.
pub fn reconcile(ctx: &AccountContext, snapshot: NftSnapshot) -> Vec<ReconciledNftView> {
    let NftSnapshot {
        user_owned,
        lendings,
        borrowings,
        escrow_held,
    } = snapshot;

    let mut views: Vec<ReconciledNftView> =
        user_owned.into_iter().map(ReconciledNftView::owned).collect();

    let custody: Vec<&NftRecord> = escrow_held
        .iter()
        .filter(|nft| nft.owner == ctx.rental_contract_id)
        .collect();

    for (leases, role) in [(lendings, NftRole::Lending), (borrowings, NftRole::Borrowing)] {
        for lease in leases {
            let (contract_id, token_id) = lease.token_key();
            match custody.iter().find(|nft| nft.matches(contract_id, token_id)) {
                Some(nft) => views.push(ReconciledNftView {
                    nft: (*nft).clone(),
                    lease: Some(lease),
                    role,
                }),
                None => debug!(
                    lease_id = %lease.lease_id,
                    contract = contract_id,
                    token = token_id,
                    role = ?role,
                    "No escrow-held NFT for lease, skipping"
                ),
            }
        }
    }

    views
}

/// Group by contract id: groups by first appearance, items keep their order.
pub fn group_by_contract(views: Vec<ReconciledNftView>) -> Vec<ContractGroup> {
    let mut groups: Vec<ContractGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for view in views {
        let slot = match index.get(&view.nft.contract_id) {
            Some(&i) => i,
            None => {
                index.insert(view.nft.contract_id.clone(), groups.len());
                groups.push(ContractGroup {
                    contract_id: view.nft.contract_id.clone(),
                    contract_name: view.nft.contract_name.clone(),
                    items: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[slot].items.push(view);
    }

    groups
}

/// Keep the first view per `(contract, token)`.
pub fn dedup_by_token(views: Vec<ReconciledNftView>) -> Vec<ReconciledNftView> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    views
        .into_iter()
        .filter(|view| seen.insert((view.nft.contract_id.clone(), view.nft.token_id.clone())))
        .collect()
}

/// A listing with its NFT's indexed metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub listing: Listing,
    pub nft: NftRecord,
}

/// Shop view: listings in input order, each with its NFT row. Listings whose
/// token is missing from the index are dropped.
pub fn join_listings(listings: Vec<Listing>, nfts: &[NftRecord]) -> Vec<ListingView> {
    let mut by_key: HashMap<(&str, &str), &NftRecord> = HashMap::new();
    for nft in nfts {
        by_key.entry(nft.token_key()).or_insert(nft);
    }

    listings
        .into_iter()
        .filter_map(|listing| match by_key.get(&listing.token_key()).copied() {
            Some(nft) => Some(ListingView {
                nft: nft.clone(),
                listing,
            }),
            None => {
                debug!(
                    contract = %listing.nft_contract_id,
                    token = %listing.nft_token_id,
                    "No indexed NFT for listing, skipping"
                );
                None
            }
        })
        .collect()
}

/// Detail page: one NFT plus its lease, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftDetail {
    pub nft: NftRecord,
    pub lease: Option<LeaseRecord>,
}

impl NftDetail {
    pub fn in_escrow(&self, rental_contract_id: &str) -> bool {
        self.nft.owner == rental_contract_id
    }
}

pub fn nft_detail(
    contract_id: &str,
    token_id: &str,
    nfts: Vec<NftRecord>,
    lease: Option<LeaseRecord>,
) -> Result<NftDetail, RentalError> {
    let nft = nfts
        .into_iter()
        .find(|nft| nft.matches(contract_id, token_id))
        .ok_or_else(|| RentalError::MissingNft {
            contract_id: contract_id.to_string(),
            token_id: token_id.to_string(),
        })?;
    Ok(NftDetail { nft, lease })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::TokenAmount;
    use crate::lease::LeaseState;

    const ME: &str = "alice.testnet";
    const RENTAL: &str = "rental.niftyrent.testnet";

    fn ctx() -> AccountContext {
        AccountContext::new(ME, RENTAL, "market.niftyrent.testnet")
    }

    fn nft(contract: &str, token: &str, owner: &str) -> NftRecord {
        NftRecord {
            contract_id: contract.into(),
            token_id: token.into(),
            title: Some(format!("{contract} #{token}")),
            media: None,
            owner: owner.into(),
            description: None,
            contract_name: Some(contract.to_uppercase()),
        }
    }

    fn lease(contract: &str, token: &str, lender: &str, borrower: &str, end: u64) -> LeaseRecord {
        LeaseRecord {
            lease_id: format!("{contract}:{token}"),
            contract_addr: contract.into(),
            token_id: token.into(),
            lender_id: lender.into(),
            borrower_id: borrower.into(),
            start_ts_nano: 0,
            end_ts_nano: end,
            price: TokenAmount(1_000),
            ft_contract_addr: "wrap.testnet".into(),
            state: LeaseState::Active,
        }
    }

    #[test]
    fn test_no_leases_yields_owned_unannotated() {
        let owned = vec![nft("a.testnet", "1", ME), nft("b.testnet", "2", ME)];
        let views = reconcile(
            &ctx(),
            NftSnapshot {
                user_owned: owned.clone(),
                ..NftSnapshot::default()
            },
        );
        assert_eq!(views.len(), 2);
        for (view, expected) in views.iter().zip(&owned) {
            assert_eq!(&view.nft, expected);
            assert_eq!(view.lease, None);
            assert_eq!(view.role, NftRole::Owned);
            assert!(!view.is_lending() && !view.is_borrowing());
        }
    }

    #[test]
    fn test_leases_attach_to_escrow_records() {
        let views = reconcile(
            &ctx(),
            NftSnapshot {
                user_owned: vec![nft("a.testnet", "1", ME)],
                lendings: vec![lease("a.testnet", "2", ME, "bob.testnet", 50)],
                borrowings: vec![lease("b.testnet", "9", "carol.testnet", ME, 80)],
                escrow_held: vec![nft("b.testnet", "9", RENTAL), nft("a.testnet", "2", RENTAL)],
            },
        );
        let roles: Vec<NftRole> = views.iter().map(|v| v.role).collect();
        assert_eq!(roles, vec![NftRole::Owned, NftRole::Lending, NftRole::Borrowing]);
        assert_eq!(views[1].nft.token_key(), ("a.testnet", "2"));
        assert_eq!(views[1].lease.as_ref().unwrap().borrower_id, "bob.testnet");
        assert!(views[2].is_borrowing());
        assert!(views[2].in_escrow(RENTAL));
    }

    #[test]
    fn test_missing_match_is_skipped() {
        let views = reconcile(
            &ctx(),
            NftSnapshot {
                lendings: vec![lease("a.testnet", "404", ME, "bob.testnet", 50)],
                ..NftSnapshot::default()
            },
        );
        assert!(views.is_empty());
    }

    #[test]
    fn test_record_not_held_by_escrow_is_ignored() {
        // Index still shows the previous owner.
        let views = reconcile(
            &ctx(),
            NftSnapshot {
                lendings: vec![lease("a.testnet", "2", ME, "bob.testnet", 50)],
                escrow_held: vec![nft("a.testnet", "2", ME)],
                ..NftSnapshot::default()
            },
        );
        assert!(views.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let views = reconcile(
            &ctx(),
            NftSnapshot {
                user_owned: vec![nft("a.testnet", "2", ME)],
                lendings: vec![lease("a.testnet", "2", ME, "bob.testnet", 50)],
                escrow_held: vec![nft("a.testnet", "2", RENTAL)],
                ..NftSnapshot::default()
            },
        );
        assert_eq!(views.len(), 2);

        let deduped = dedup_by_token(views);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].role, NftRole::Owned);
    }

    #[test]
    fn test_claimable_and_expiring() {
        let t0 = 1_000;
        let lent = ReconciledNftView {
            nft: nft("a.testnet", "2", RENTAL),
            lease: Some(lease("a.testnet", "2", ME, "bob.testnet", t0)),
            role: NftRole::Lending,
        };
        assert!(lent.is_claimable(t0 + 1));
        assert!(!lent.is_claimable(t0));
        assert!(lent.is_expiring(t0 - 1));
        assert!(!lent.is_expiring(t0 + 1));

        let borrowed = ReconciledNftView {
            role: NftRole::Borrowing,
            ..lent.clone()
        };
        assert!(!borrowed.is_claimable(t0 + 1));

        let owned = ReconciledNftView::owned(nft("a.testnet", "3", ME));
        assert!(!owned.is_claimable(u64::MAX));
        assert!(!owned.is_expiring(0));
    }

    #[test]
    fn test_group_by_contract_keeps_first_seen_order() {
        let views = vec![
            ReconciledNftView::owned(nft("b.testnet", "1", ME)),
            ReconciledNftView::owned(nft("a.testnet", "5", ME)),
            ReconciledNftView::owned(nft("b.testnet", "0", ME)),
            ReconciledNftView::owned(nft("a.testnet", "2", ME)),
        ];
        let groups = group_by_contract(views);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].contract_id, "b.testnet");
        assert_eq!(groups[0].contract_name.as_deref(), Some("B.TESTNET"));
        let tokens: Vec<&str> = groups[0].items.iter().map(|v| v.nft.token_id.as_str()).collect();
        assert_eq!(tokens, vec!["1", "0"]);
        let tokens: Vec<&str> = groups[1].items.iter().map(|v| v.nft.token_id.as_str()).collect();
        assert_eq!(tokens, vec!["5", "2"]);
    }

    fn listing(token: &str) -> Listing {
        Listing {
            owner_id: "bob.testnet".into(),
            approval_id: 1,
            nft_contract_id: "a.testnet".into(),
            nft_token_id: token.into(),
            ft_contract_id: "wrap.testnet".into(),
            price: TokenAmount(5),
            lease_start_ts_nano: 0,
            lease_end_ts_nano: 10,
        }
    }

    #[test]
    fn test_join_listings_skips_unindexed() {
        let nfts = vec![nft("a.testnet", "3", "bob.testnet"), nft("a.testnet", "1", "bob.testnet")];
        let joined = join_listings(vec![listing("1"), listing("2"), listing("3")], &nfts);
        let tokens: Vec<&str> = joined.iter().map(|v| v.nft.token_id.as_str()).collect();
        assert_eq!(tokens, vec!["1", "3"]);
        assert_eq!(joined[0].listing.nft_token_id, "1");
    }

    #[test]
    fn test_nft_detail() {
        let detail = nft_detail(
            "a.testnet",
            "2",
            vec![nft("a.testnet", "2", RENTAL)],
            Some(lease("a.testnet", "2", ME, "bob.testnet", 5)),
        )
        .unwrap();
        assert!(detail.in_escrow(RENTAL));
        assert_eq!(detail.lease.unwrap().lender_id, ME);

        assert_eq!(
            nft_detail("a.testnet", "2", vec![], None),
            Err(RentalError::MissingNft {
                contract_id: "a.testnet".into(),
                token_id: "2".into()
            })
        );
    }
}
