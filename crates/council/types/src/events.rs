//! Council events and their log positions
//!
//! Field names and shapes mirror what the indexer consumes; changing them
//! breaks replay of previously exported logs.

use crate::{Address, BudgetAllocation, CouncilId, PoolId, Role, TxHash, Units};
use serde::{Deserialize, Serialize};

/// A state change published by a council
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouncilEvent {
    /// Emitted by the factory before any other event of the new council
    CouncilCreated {
        council: CouncilId,
        pool: PoolId,
        council_name: String,
        council_symbol: String,
        distribution_token: Address,
    },
    MemberAdded {
        account: Address,
        voting_power: Units,
    },
    MemberRemoved {
        account: Address,
    },
    GranteeAdded {
        name: String,
        account: Address,
    },
    GranteeRemoved {
        account: Address,
    },
    BudgetAllocated {
        member: Address,
        allocation: BudgetAllocation,
    },
    MaxAllocationsPerMemberSet {
        max_allocations_per_member: u8,
    },
    Withdrawn {
        token: Address,
        account: Address,
        amount: Units,
    },
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
}

impl CouncilEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CouncilEvent::CouncilCreated { .. } => "CouncilCreated",
            CouncilEvent::MemberAdded { .. } => "MemberAdded",
            CouncilEvent::MemberRemoved { .. } => "MemberRemoved",
            CouncilEvent::GranteeAdded { .. } => "GranteeAdded",
            CouncilEvent::GranteeRemoved { .. } => "GranteeRemoved",
            CouncilEvent::BudgetAllocated { .. } => "BudgetAllocated",
            CouncilEvent::MaxAllocationsPerMemberSet { .. } => "MaxAllocationsPerMemberSet",
            CouncilEvent::Withdrawn { .. } => "Withdrawn",
            CouncilEvent::RoleGranted { .. } => "RoleGranted",
            CouncilEvent::RoleRevoked { .. } => "RoleRevoked",
        }
    }
}

/// Global ordering key of a logged event: block timestamp, then block,
/// then position inside the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventPosition {
    pub timestamp: i64,
    pub block_number: u64,
    pub log_index: u32,
}

impl EventPosition {
    pub fn new(timestamp: i64, block_number: u64, log_index: u32) -> Self {
        Self {
            timestamp,
            block_number,
            log_index,
        }
    }
}

impl std::fmt::Display for EventPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}#{}",
            self.block_number, self.timestamp, self.log_index
        )
    }
}

/// An event as recorded in the append-only log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// The council that emitted the event
    pub council: CouncilId,
    /// Transaction that produced the event
    pub tx_hash: TxHash,
    pub position: EventPosition,
    pub event: CouncilEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let a = EventPosition::new(100, 5, 3);
        let b = EventPosition::new(100, 5, 4);
        let c = EventPosition::new(101, 1, 0);
        let mut positions = vec![c, b, a];
        positions.sort();
        assert_eq!(positions, vec![a, b, c]);
    }

    #[test]
    fn test_event_json_shape() {
        let event = CouncilEvent::BudgetAllocated {
            member: Address::from_low_u64(1),
            allocation: BudgetAllocation::new(vec![Address::from_low_u64(2)], vec![50]),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value["BudgetAllocated"]["allocation"]["amounts"][0],
            serde_json::json!(50)
        );
        let back: CouncilEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.name(), "BudgetAllocated");
    }
}
