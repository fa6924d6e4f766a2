//! Allocation request files
//!
//! ```toml
//! member = "0x000000000000000000000000000000000000000a"
//!
//! [[allocations]]
//! account = "0x0000000000000000000000000000000000000014"
//! amount = 30
//! ```

use crate::error::{CliError, CliResult};
use council_types::{Address, BudgetAllocation, Units};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AllocationEntryConfig {
    pub account: Address,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AllocationFile {
    pub member: Address,
    #[serde(default)]
    pub allocations: Vec<AllocationEntryConfig>,
}

impl AllocationFile {
    pub fn from_toml_str(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_budget_allocation(&self) -> BudgetAllocation {
        BudgetAllocation::from_pairs(
            self.allocations
                .iter()
                .map(|entry| (entry.account, Units::from(entry.amount))),
        )
    }
}
