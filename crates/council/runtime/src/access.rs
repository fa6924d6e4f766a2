//! Access Control - capability table for council write operations
//!
//! Every mutating council operation starts with [`AccessControl::require`].
//! Roles are plain set membership; there is no role hierarchy beyond the
//! rule that only [`Role::Admin`] may grant or revoke.

use council_types::{Address, CouncilError, CouncilResult, Role};
use std::collections::{BTreeSet, HashMap};

/// Role → accounts table
#[derive(Clone, Debug, Default)]
pub struct AccessControl {
    grants: HashMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    /// Empty table: nobody holds any role
    pub fn new() -> Self {
        Self::default()
    }

    /// Table where `admin` holds every role
    pub fn with_admin(admin: Address) -> Self {
        let mut access = Self::new();
        for role in Role::ALL {
            access.grant(role, admin);
        }
        access
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.grants
            .get(&role)
            .map(|holders| holders.contains(account))
            .unwrap_or(false)
    }

    /// Capability check evaluated before any state change
    pub fn require(&self, caller: &Address, role: Role) -> CouncilResult<()> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(CouncilError::Unauthorized {
                account: *caller,
                role,
            })
        }
    }

    /// Returns true if the account did not already hold the role
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.grants.entry(role).or_default().insert(account)
    }

    /// Returns true if the account held the role
    pub fn revoke(&mut self, role: Role, account: &Address) -> bool {
        self.grants
            .get_mut(&role)
            .map(|holders| holders.remove(account))
            .unwrap_or(false)
    }

    pub fn holders(&self, role: Role) -> Vec<Address> {
        self.grants
            .get(&role)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_holds_all_roles() {
        let admin = Address::from_low_u64(1);
        let access = AccessControl::with_admin(admin);
        for role in Role::ALL {
            assert!(access.require(&admin, role).is_ok());
        }
    }

    #[test]
    fn test_require_rejects_missing_role() {
        let access = AccessControl::with_admin(Address::from_low_u64(1));
        let outsider = Address::from_low_u64(2);

        let err = access.require(&outsider, Role::MemberManager).unwrap_err();
        assert_eq!(
            err,
            CouncilError::Unauthorized {
                account: outsider,
                role: Role::MemberManager
            }
        );
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut access = AccessControl::new();
        let account = Address::from_low_u64(3);

        assert!(access.grant(Role::GranteeManager, account));
        assert!(!access.grant(Role::GranteeManager, account));
        assert!(access.has_role(Role::GranteeManager, &account));
        assert!(!access.has_role(Role::MemberManager, &account));
        assert_eq!(access.holders(Role::GranteeManager), vec![account]);

        assert!(access.revoke(Role::GranteeManager, &account));
        assert!(!access.revoke(Role::GranteeManager, &account));
        assert!(access.holders(Role::GranteeManager).is_empty());
    }
}
