//! Read model store and queries

use crate::model::{
    AllocationEntity, AllocationId, CouncilEntity, CouncilMemberEntity, GranteeEntity,
    ReadModelSnapshot,
};
use council_types::{Address, CouncilId, GranteeId, MemberKey};
use std::collections::BTreeMap;

/// Keyed entity tables maintained by the indexer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadModel {
    pub(crate) councils: BTreeMap<CouncilId, CouncilEntity>,
    pub(crate) members: BTreeMap<MemberKey, CouncilMemberEntity>,
    pub(crate) grantees: BTreeMap<GranteeId, GranteeEntity>,
    /// Latest generation per (council, account)
    pub(crate) current_grantees: BTreeMap<(CouncilId, Address), GranteeId>,
    pub(crate) allocations: BTreeMap<AllocationId, AllocationEntity>,
}

impl ReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn council(&self, id: &CouncilId) -> Option<&CouncilEntity> {
        self.councils.get(id)
    }

    pub fn councils(&self) -> Vec<&CouncilEntity> {
        self.councils.values().collect()
    }

    pub fn member(&self, council: &CouncilId, account: &Address) -> Option<&CouncilMemberEntity> {
        self.members.get(&MemberKey::new(*council, *account))
    }

    /// Enabled members of `council`
    pub fn members(&self, council: &CouncilId) -> Vec<&CouncilMemberEntity> {
        self.members
            .values()
            .filter(|m| &m.council == council && m.enabled)
            .collect()
    }

    /// Latest generation of the grantee at `account`, enabled or not
    pub fn grantee(&self, council: &CouncilId, account: &Address) -> Option<&GranteeEntity> {
        self.current_grantees
            .get(&(*council, *account))
            .and_then(|id| self.grantees.get(id))
    }

    /// Enabled grantees of `council`
    pub fn grantees(&self, council: &CouncilId) -> Vec<&GranteeEntity> {
        self.grantees
            .values()
            .filter(|g| &g.council == council && g.enabled)
            .collect()
    }

    /// Every generation ever indexed for `account`, oldest first
    pub fn grantee_history(&self, council: &CouncilId, account: &Address) -> Vec<&GranteeEntity> {
        self.grantees
            .values()
            .filter(|g| &g.council == council && &g.account == account)
            .collect()
    }

    pub fn allocation(&self, id: &AllocationId) -> Option<&AllocationEntity> {
        self.allocations.get(id)
    }

    /// Most recent allocation submitted by `member`
    pub fn latest_allocation(
        &self,
        council: &CouncilId,
        member: &Address,
    ) -> Option<&AllocationEntity> {
        let key = MemberKey::new(*council, *member);
        self.allocations
            .values()
            .filter(|a| a.council_member == key)
            .max_by_key(|a| (a.allocated_at, a.position))
    }

    /// Latest allocation of every member of `council` that has one
    pub fn latest_allocations(&self, council: &CouncilId) -> Vec<&AllocationEntity> {
        let mut latest: BTreeMap<MemberKey, &AllocationEntity> = BTreeMap::new();
        for allocation in self.allocations.values().filter(|a| &a.council == council) {
            let newer = latest
                .get(&allocation.council_member)
                .map(|current| {
                    (allocation.allocated_at, allocation.position)
                        > (current.allocated_at, current.position)
                })
                .unwrap_or(true);
            if newer {
                latest.insert(allocation.council_member, allocation);
            }
        }
        latest.into_values().collect()
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn snapshot(&self) -> ReadModelSnapshot {
        ReadModelSnapshot {
            councils: self.councils.values().cloned().collect(),
            council_members: self.members.values().cloned().collect(),
            grantees: self.grantees.values().cloned().collect(),
            allocations: self.allocations.values().cloned().collect(),
        }
    }
}
