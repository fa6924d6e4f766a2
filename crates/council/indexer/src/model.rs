//! Indexed entities
//!
//! Keys mirror the ledger: members by `(council, account)`, grantees by
//! `(council, account, generation)`, allocations by `(tx_hash, log_index)`.

use council_types::{Address, CouncilId, EventPosition, GranteeId, MemberKey, PoolId, TxHash, Units};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilEntity {
    pub id: CouncilId,
    pub council_name: String,
    pub council_symbol: String,
    pub pool: PoolId,
    pub distribution_token: Address,
    pub max_allocations_per_member: u8,
    pub created_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilMemberEntity {
    pub id: MemberKey,
    pub council: CouncilId,
    pub account: Address,
    pub voting_power: Units,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeEntity {
    pub id: GranteeId,
    pub council: CouncilId,
    pub name: String,
    pub account: Address,
    pub enabled: bool,
}

/// Allocation key: the emitting transaction and the event's log index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationId {
    pub tx_hash: TxHash,
    pub log_index: u32,
}

impl AllocationId {
    pub fn new(tx_hash: TxHash, log_index: u32) -> Self {
        Self { tx_hash, log_index }
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tx_hash, self.log_index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntity {
    pub id: AllocationId,
    pub council: CouncilId,
    pub council_member: MemberKey,
    /// Block timestamp of the allocating transaction
    pub allocated_at: i64,
    pub position: EventPosition,
    /// Grantee identities current at indexing time, in request order
    pub grantees: Vec<GranteeId>,
    pub amounts: Vec<Units>,
}

impl AllocationEntity {
    /// Sum of the amounts, saturating at `Units::MAX`
    pub fn total(&self) -> Units {
        self.amounts.iter().fold(0, |acc, a| acc.saturating_add(*a))
    }
}

/// Flat export of the whole read model
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadModelSnapshot {
    pub councils: Vec<CouncilEntity>,
    pub council_members: Vec<CouncilMemberEntity>,
    pub grantees: Vec<GranteeEntity>,
    pub allocations: Vec<AllocationEntity>,
}

impl ReadModelSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
