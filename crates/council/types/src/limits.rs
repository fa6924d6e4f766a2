//! Council-wide numeric bounds

/// Allocation amounts, pool units and voting power share one unit type.
pub type Units = u128;

/// Upper bound on a single member's voting power.
pub const MAX_VOTING_POWER: Units = 1_000_000;

/// Upper bound accepted by `set_max_allocations_per_member`.
pub const MAX_ALLOCATIONS_PER_MEMBER: u8 = 10;

/// Cap applied to freshly created councils.
pub const DEFAULT_MAX_ALLOCATIONS_PER_MEMBER: u8 = 10;

/// The voting token is a whole-unit count.
pub const VOTING_TOKEN_DECIMALS: u8 = 0;
