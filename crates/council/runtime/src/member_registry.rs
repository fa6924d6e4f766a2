//! Member Registry - council members and their voting power
//!
//! Voting power doubles as the balance of the council's non-transferable
//! voting token. Removed members stay in the table as tombstones so that a
//! later re-add is an update rather than a fresh insert.

use council_types::{Address, CouncilError, CouncilResult, MemberRecord, Units, MAX_VOTING_POWER};
use std::collections::HashMap;

/// Keyed store of member records
#[derive(Clone, Debug, Default)]
pub struct MemberRegistry {
    members: HashMap<Address, MemberRecord>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an add without touching state
    pub fn check_add(&self, account: &Address, voting_power: Units) -> CouncilResult<()> {
        if self.is_member(account) {
            return Err(CouncilError::MemberAlreadyExists(*account));
        }
        if voting_power == 0 {
            return Err(CouncilError::InvalidAmount);
        }
        if voting_power > MAX_VOTING_POWER {
            return Err(CouncilError::VotingPowerTooHigh {
                requested: voting_power,
                max: MAX_VOTING_POWER,
            });
        }
        Ok(())
    }

    /// Add or re-enable a member
    pub fn add(&mut self, account: Address, voting_power: Units) -> CouncilResult<()> {
        self.check_add(&account, voting_power)?;
        self.members
            .insert(account, MemberRecord::new(account, voting_power));
        Ok(())
    }

    pub fn check_remove(&self, account: &Address) -> CouncilResult<()> {
        if self.is_member(account) {
            Ok(())
        } else {
            Err(CouncilError::MemberNotFound(*account))
        }
    }

    /// Tombstone a member
    pub fn remove(&mut self, account: &Address) -> CouncilResult<()> {
        self.check_remove(account)?;
        if let Some(record) = self.members.get_mut(account) {
            record.disable();
        }
        Ok(())
    }

    pub fn get(&self, account: &Address) -> Option<&MemberRecord> {
        self.members.get(account)
    }

    pub fn is_member(&self, account: &Address) -> bool {
        self.members
            .get(account)
            .map(|m| m.is_active())
            .unwrap_or(false)
    }

    /// Zero for unknown and removed accounts
    pub fn voting_power(&self, account: &Address) -> Units {
        self.members
            .get(account)
            .filter(|m| m.is_active())
            .map(|m| m.voting_power)
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> Units {
        self.members
            .values()
            .filter(|m| m.is_active())
            .map(|m| m.voting_power)
            .sum()
    }

    /// Enabled members, ordered by account
    pub fn active_members(&self) -> Vec<&MemberRecord> {
        let mut members: Vec<_> = self.members.values().filter(|m| m.is_active()).collect();
        members.sort_by_key(|m| m.account);
        members
    }

    pub fn active_count(&self) -> usize {
        self.members.values().filter(|m| m.is_active()).count()
    }
}
