//! Council creation configuration
//!
//! The same shape the factory consumes, loadable from TOML:
//!
//! ```toml
//! council_name = "Spacing Guild"
//! council_symbol = "SPA"
//! distribution_token = "0x4ac8bd1bdae47beef2d1c6aa62229509b962aa0d"
//!
//! [[council_members]]
//! account = "0x0000000000000000000000000000000000000001"
//! voting_power = 50
//!
//! [[grantees]]
//! name = "Giveth House"
//! account = "0xb6989f472bef8931e6ca882b1f875539b7d5da19"
//! ```

use crate::{Address, CouncilError, CouncilResult, Units};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial member entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    pub account: Address,
    pub voting_power: u64,
}

impl MemberConfig {
    pub fn voting_power_units(&self) -> Units {
        Units::from(self.voting_power)
    }
}

/// Initial grantee entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeConfig {
    pub name: String,
    pub account: Address,
}

/// Everything needed to create a council
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilConfig {
    pub council_name: String,
    pub council_symbol: String,
    pub distribution_token: Address,
    /// Overrides the default allocation cap when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_allocations_per_member: Option<u8>,
    #[serde(default)]
    pub council_members: Vec<MemberConfig>,
    #[serde(default)]
    pub grantees: Vec<GranteeConfig>,
}

impl CouncilConfig {
    pub fn new(
        council_name: impl Into<String>,
        council_symbol: impl Into<String>,
        distribution_token: Address,
    ) -> Self {
        Self {
            council_name: council_name.into(),
            council_symbol: council_symbol.into(),
            distribution_token,
            max_allocations_per_member: None,
            council_members: Vec::new(),
            grantees: Vec::new(),
        }
    }

    pub fn with_member(mut self, account: Address, voting_power: u64) -> Self {
        self.council_members.push(MemberConfig {
            account,
            voting_power,
        });
        self
    }

    pub fn with_grantee(mut self, name: impl Into<String>, account: Address) -> Self {
        self.grantees.push(GranteeConfig {
            name: name.into(),
            account,
        });
        self
    }

    pub fn with_max_allocations_per_member(mut self, max: u8) -> Self {
        self.max_allocations_per_member = Some(max);
        self
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> CouncilResult<Self> {
        toml::from_str(contents).map_err(|e| CouncilError::Config(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> CouncilResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CouncilError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> CouncilResult<String> {
        toml::to_string_pretty(self).map_err(|e| CouncilError::Config(e.to_string()))
    }
}
