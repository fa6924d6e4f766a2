//! Allocation Ledger - per-member budget splits and per-grantee aggregates
//!
//! Every mutation is two-phase: a `plan_*` call computes a [`LedgerUpdate`]
//! (new rows, changed grantee shares, new total) without touching state,
//! and [`AllocationLedger::apply`] commits it once the sink has accepted
//! the share changes.

use council_types::{
    Address, AllocationEntry, BudgetAllocation, CouncilError, CouncilResult, GranteeId,
    MemberAllocation, Units,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One grantee's aggregate moving from `before` to `after`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareChange {
    pub grantee: GranteeId,
    pub before: Units,
    pub after: Units,
}

/// Staged ledger mutation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerUpdate {
    /// Replacement rows; `None` clears the member's row
    pub rows: Vec<(Address, Option<MemberAllocation>)>,
    /// Grantee aggregates that change, ordered by grantee
    pub shares: Vec<ShareChange>,
    pub total_allocated: Units,
}

impl LedgerUpdate {
    pub fn changes_shares(&self) -> bool {
        !self.shares.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct AllocationLedger {
    rows: HashMap<Address, MemberAllocation>,
    grantee_units: HashMap<GranteeId, Units>,
    total_allocated: Units,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a request and merge duplicate accounts.
    ///
    /// Checks run in a fixed order: array lengths, distinct grantee count,
    /// grantee existence, non-zero amounts, then the sum against
    /// `voting_power`. The member check happens before this, in the council.
    pub fn validate<F>(
        request: &BudgetAllocation,
        voting_power: Units,
        max_allocations: u8,
        resolve: F,
    ) -> CouncilResult<MemberAllocation>
    where
        F: Fn(&Address) -> CouncilResult<GranteeId>,
    {
        if request.accounts.len() != request.amounts.len() {
            return Err(CouncilError::LengthMismatch {
                accounts: request.accounts.len(),
                amounts: request.amounts.len(),
            });
        }

        let distinct: BTreeSet<&Address> = request.accounts.iter().collect();
        if distinct.len() > usize::from(max_allocations) {
            return Err(CouncilError::TooManyAllocations {
                requested: distinct.len(),
                max: max_allocations,
            });
        }

        let ids = request
            .accounts
            .iter()
            .map(&resolve)
            .collect::<CouncilResult<Vec<_>>>()?;

        if request.amounts.iter().any(|amount| *amount == 0) {
            return Err(CouncilError::InvalidAmount);
        }

        let mut required: Units = 0;
        for amount in &request.amounts {
            required = required
                .checked_add(*amount)
                .ok_or(CouncilError::ExceedsBalance {
                    required: Units::MAX,
                    available: voting_power,
                })?;
        }
        if required > voting_power {
            return Err(CouncilError::ExceedsBalance {
                required,
                available: voting_power,
            });
        }

        // First occurrence fixes the entry's position
        let mut row = MemberAllocation::new();
        for (grantee, amount) in ids.into_iter().zip(request.amounts.iter().copied()) {
            match row.entries.iter_mut().find(|e| e.grantee == grantee) {
                Some(entry) => entry.amount += amount,
                None => row.entries.push(AllocationEntry { grantee, amount }),
            }
        }
        Ok(row)
    }

    /// Replace `member`'s row with `row`
    pub fn plan_allocation(&self, member: Address, row: MemberAllocation) -> LedgerUpdate {
        let empty = MemberAllocation::new();
        let old = self.rows.get(&member).unwrap_or(&empty);
        let shares = self.share_changes(old, &row);
        let total_allocated = self.total_allocated - old.total() + row.total();

        let row = if row.is_empty() { None } else { Some(row) };
        LedgerUpdate {
            rows: vec![(member, row)],
            shares,
            total_allocated,
        }
    }

    /// Clear `member`'s row
    pub fn plan_member_removal(&self, member: &Address) -> LedgerUpdate {
        self.plan_allocation(*member, MemberAllocation::new())
    }

    /// Drop `grantee` from every row and zero its aggregate
    pub fn plan_grantee_removal(&self, grantee: &GranteeId) -> LedgerUpdate {
        let mut rows = Vec::new();
        let mut removed: Units = 0;
        for (member, row) in &self.rows {
            if row.amount_for(grantee) == 0 {
                continue;
            }
            let mut row = row.clone();
            removed += row.remove_grantee(grantee);
            let row = if row.is_empty() { None } else { Some(row) };
            rows.push((*member, row));
        }
        rows.sort_by_key(|(member, _)| *member);

        let before = self.units_of(grantee);
        let shares = if before == 0 {
            Vec::new()
        } else {
            vec![ShareChange {
                grantee: *grantee,
                before,
                after: 0,
            }]
        };

        LedgerUpdate {
            rows,
            shares,
            total_allocated: self.total_allocated - removed,
        }
    }

    /// Commit a staged update
    pub fn apply(&mut self, update: LedgerUpdate) {
        for (member, row) in update.rows {
            match row {
                Some(row) => {
                    self.rows.insert(member, row);
                }
                None => {
                    self.rows.remove(&member);
                }
            }
        }
        for change in update.shares {
            if change.after == 0 {
                self.grantee_units.remove(&change.grantee);
            } else {
                self.grantee_units.insert(change.grantee, change.after);
            }
        }
        self.total_allocated = update.total_allocated;
    }

    pub fn row(&self, member: &Address) -> Option<&MemberAllocation> {
        self.rows.get(member)
    }

    /// Aggregate allocated to one grantee identity across all members
    pub fn units_of(&self, grantee: &GranteeId) -> Units {
        self.grantee_units.get(grantee).copied().unwrap_or(0)
    }

    pub fn total_allocated(&self) -> Units {
        self.total_allocated
    }

    pub fn member_count(&self) -> usize {
        self.rows.len()
    }

    fn share_changes(&self, old: &MemberAllocation, new: &MemberAllocation) -> Vec<ShareChange> {
        let mut deltas: BTreeMap<GranteeId, (Units, Units)> = BTreeMap::new();
        for entry in &old.entries {
            deltas.entry(entry.grantee).or_default().0 += entry.amount;
        }
        for entry in &new.entries {
            deltas.entry(entry.grantee).or_default().1 += entry.amount;
        }

        deltas
            .into_iter()
            .filter(|(_, (removed, added))| removed != added)
            .map(|(grantee, (removed, added))| {
                let before = self.units_of(&grantee);
                ShareChange {
                    grantee,
                    before,
                    after: before - removed + added,
                }
            })
            .collect()
    }
}
