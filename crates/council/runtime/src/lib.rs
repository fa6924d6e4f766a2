//! Council Runtime
//!
//! Accounting core of a CouncilHaus council: a fixed set of members
//! periodically split their voting power across grantee projects, and the
//! aggregate per grantee becomes that grantee's share of a streamed budget.
//!
//! # Architecture
//!
//! The [`Council`] owns every keyed store and is the only entry point for
//! mutations:
//!
//! - [`AccessControl`] - Role capability table checked before every write
//! - [`MemberRegistry`] - Members and voting power (the voting token view)
//! - [`GranteeRegistry`] - Grantees, with a fresh identity on every re-add
//! - [`AllocationLedger`] - Per-member rows and per-grantee aggregates
//! - [`DistributionSink`] - The external pool that receives unit shares
//! - [`EventLog`] - Append-only transactions consumed by the indexer
//!
//! [`CouncilFactory`] creates councils from a [`council_types::CouncilConfig`].
//!
//! # Example
//!
//! ```rust
//! use council_runtime::{CouncilFactory, EventLog, InMemoryPool};
//! use council_types::{Address, BudgetAllocation, CouncilConfig};
//!
//! let member = Address::from_low_u64(10);
//! let grantee = Address::from_low_u64(20);
//! let config = CouncilConfig::new("Spacing Guild", "SPA", Address::from_low_u64(0xe7))
//!     .with_member(member, 100)
//!     .with_grantee("Giveth House", grantee);
//!
//! let mut log = EventLog::new();
//! let mut factory = CouncilFactory::new(Address::from_low_u64(0xfa));
//! let mut council = factory
//!     .create_council(&Address::from_low_u64(1), &config, InMemoryPool::new(), &mut log)
//!     .unwrap();
//!
//! council
//!     .allocate(&member, BudgetAllocation::new(vec![grantee], vec![60]), &mut log)
//!     .unwrap();
//! assert_eq!(council.total_allocated(), 60);
//! assert_eq!(council.grantee_units(&grantee), 60);
//! ```

#![deny(unsafe_code)]

pub mod access;
pub mod allocation_ledger;
pub mod council;
pub mod custody;
pub mod event_log;
pub mod factory;
pub mod grantee_registry;
pub mod member_registry;
pub mod sink;

pub use access::AccessControl;
pub use allocation_ledger::{AllocationLedger, LedgerUpdate, ShareChange};
pub use council::Council;
pub use custody::{InMemoryCustody, TokenCustody};
pub use event_log::{EventLog, EventLogError};
pub use factory::CouncilFactory;
pub use grantee_registry::GranteeRegistry;
pub use member_registry::MemberRegistry;
pub use sink::{DistributionSink, InMemoryPool};
