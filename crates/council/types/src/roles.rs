//! Capability roles gating council write operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability that can be granted to an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages roles, the allocation cap, and token sweeps
    Admin,
    /// Adds and removes council members
    MemberManager,
    /// Adds and removes grantees
    GranteeManager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::MemberManager, Role::GranteeManager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "DEFAULT_ADMIN_ROLE",
            Role::MemberManager => "MEMBER_MANAGER_ROLE",
            Role::GranteeManager => "GRANTEE_MANAGER_ROLE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
