//! Ledger records: members, grantees and allocations
//!
//! These are the authoritative rows held by the council. They are plain
//! data; validation and cascades live in the runtime.

use crate::{Address, CouncilId, GranteeId, PoolId, Units};
use serde::{Deserialize, Serialize};

/// A council member and their voting power.
///
/// Removal tombstones the record (`enabled = false`, `voting_power = 0`)
/// rather than deleting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub account: Address,
    pub voting_power: Units,
    pub enabled: bool,
}

impl MemberRecord {
    pub fn new(account: Address, voting_power: Units) -> Self {
        Self {
            account,
            voting_power,
            enabled: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled
    }

    /// Tombstone the member
    pub fn disable(&mut self) {
        self.voting_power = 0;
        self.enabled = false;
    }
}

/// A grantee eligible to receive allocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeRecord {
    pub id: GranteeId,
    pub name: String,
    pub account: Address,
    pub enabled: bool,
}

impl GranteeRecord {
    pub fn new(id: GranteeId, name: impl Into<String>) -> Self {
        Self {
            account: id.account,
            id,
            name: name.into(),
            enabled: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Parallel-array allocation as submitted by a member and published in
/// `BudgetAllocated`. Amounts are absolute unit counts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub accounts: Vec<Address>,
    pub amounts: Vec<Units>,
}

impl BudgetAllocation {
    pub fn new(accounts: Vec<Address>, amounts: Vec<Units>) -> Self {
        Self { accounts, amounts }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Address, Units)>) -> Self {
        let (accounts, amounts) = pairs.into_iter().unzip();
        Self { accounts, amounts }
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.amounts.is_empty()
    }
}

/// One (grantee, amount) entry of a member's allocation row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub grantee: GranteeId,
    pub amount: Units,
}

/// A member's current allocation row, keyed by grantee identity
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAllocation {
    pub entries: Vec<AllocationEntry>,
}

impl MemberAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all amounts in the row
    pub fn total(&self) -> Units {
        self.entries.iter().map(|e| e.amount).sum()
    }

    pub fn amount_for(&self, grantee: &GranteeId) -> Units {
        self.entries
            .iter()
            .filter(|e| &e.grantee == grantee)
            .map(|e| e.amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn grantees(&self) -> impl Iterator<Item = &GranteeId> {
        self.entries.iter().map(|e| &e.grantee)
    }

    /// Drop every entry for `grantee`, returning the amount removed
    pub fn remove_grantee(&mut self, grantee: &GranteeId) -> Units {
        let removed = self.amount_for(grantee);
        self.entries.retain(|e| &e.grantee != grantee);
        removed
    }

    /// Render the row in the parallel-array wire shape
    pub fn to_budget_allocation(&self) -> BudgetAllocation {
        BudgetAllocation::from_pairs(self.entries.iter().map(|e| (e.grantee.account, e.amount)))
    }
}

/// Result of `get_allocation`: the row, its total, and the member's balance
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationView {
    pub allocation: BudgetAllocation,
    pub total_allocated: Units,
    pub voting_power: Units,
}

/// Council-level configuration and metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilInfo {
    pub id: CouncilId,
    pub council_name: String,
    pub council_symbol: String,
    pub distribution_token: Address,
    pub pool: PoolId,
    pub max_allocations_per_member: u8,
}
