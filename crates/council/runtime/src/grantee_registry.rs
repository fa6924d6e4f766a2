//! Grantee Registry - projects eligible to receive allocations
//!
//! Every (re-)add mints a new [`GranteeId`] generation for the account, so
//! allocations made to an earlier incarnation never carry over.

use council_types::{Address, CouncilError, CouncilId, CouncilResult, GranteeId, GranteeRecord};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct GranteeRegistry {
    council: CouncilId,
    grantees: HashMap<GranteeId, GranteeRecord>,
    /// Latest generation per account
    current: HashMap<Address, GranteeId>,
}

impl GranteeRegistry {
    pub fn new(council: CouncilId) -> Self {
        Self {
            council,
            grantees: HashMap::new(),
            current: HashMap::new(),
        }
    }

    pub fn check_add(&self, account: &Address) -> CouncilResult<()> {
        if self.is_grantee(account) {
            Err(CouncilError::GranteeAlreadyExists(*account))
        } else {
            Ok(())
        }
    }

    /// Identity the next add of `account` will receive
    pub fn next_id(&self, account: &Address) -> GranteeId {
        match self.current.get(account) {
            Some(id) => id.next_generation(),
            None => GranteeId::new(self.council, *account, 0),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, account: Address) -> CouncilResult<GranteeId> {
        self.check_add(&account)?;
        let id = self.next_id(&account);
        self.grantees.insert(id, GranteeRecord::new(id, name));
        self.current.insert(account, id);
        Ok(id)
    }

    /// Identity of the enabled grantee at `account`
    pub fn resolve_active(&self, account: &Address) -> CouncilResult<GranteeId> {
        self.current
            .get(account)
            .filter(|id| self.grantees.get(*id).map(|g| g.is_active()).unwrap_or(false))
            .copied()
            .ok_or(CouncilError::GranteeNotFound(*account))
    }

    /// Tombstone the current generation and return its identity
    pub fn remove(&mut self, account: &Address) -> CouncilResult<GranteeId> {
        let id = self.resolve_active(account)?;
        if let Some(record) = self.grantees.get_mut(&id) {
            record.disable();
        }
        Ok(id)
    }

    pub fn is_grantee(&self, account: &Address) -> bool {
        self.resolve_active(account).is_ok()
    }

    pub fn get(&self, id: &GranteeId) -> Option<&GranteeRecord> {
        self.grantees.get(id)
    }

    /// Enabled grantees, ordered by account
    pub fn active_grantees(&self) -> Vec<&GranteeRecord> {
        let mut grantees: Vec<_> = self.grantees.values().filter(|g| g.is_active()).collect();
        grantees.sort_by_key(|g| g.account);
        grantees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> GranteeRegistry {
        GranteeRegistry::new(CouncilId::new(Address::from_low_u64(99)))
    }

    #[test]
    fn test_add_and_resolve() {
        let mut grantees = registry();
        let account = Address::from_low_u64(7);
        let id = grantees.add("Giveth House", account).unwrap();

        assert_eq!(id.generation, 0);
        assert!(grantees.is_grantee(&account));
        assert_eq!(grantees.resolve_active(&account), Ok(id));
        assert_eq!(grantees.get(&id).unwrap().name, "Giveth House");
        assert_eq!(
            grantees.add("Again", account),
            Err(CouncilError::GranteeAlreadyExists(account))
        );
    }

    #[test]
    fn test_readd_mints_new_generation() {
        let mut grantees = registry();
        let account = Address::from_low_u64(7);
        let first = grantees.add("First", account).unwrap();
        assert_eq!(grantees.remove(&account), Ok(first));
        assert!(!grantees.is_grantee(&account));

        let second = grantees.add("Second", account).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.generation, 1);
        assert!(!grantees.get(&first).unwrap().is_active());
        assert_eq!(grantees.active_grantees().len(), 1);
    }

    #[test]
    fn test_remove_unknown() {
        let mut grantees = registry();
        let account = Address::from_low_u64(8);
        assert_eq!(
            grantees.remove(&account),
            Err(CouncilError::GranteeNotFound(account))
        );
    }
}
