//! Council - the service object owning every keyed store of one council
//!
//! Each public operation runs the same pipeline: capability check,
//! registry/ledger validation, a staged ledger update, share pushes to the
//! distribution sink, and only then the state commit and a single event-log
//! transaction. A failure at any step leaves the council, the sink and the
//! log as they were.

use crate::access::AccessControl;
use crate::allocation_ledger::{AllocationLedger, LedgerUpdate, ShareChange};
use crate::custody::TokenCustody;
use crate::event_log::EventLog;
use crate::grantee_registry::GranteeRegistry;
use crate::member_registry::MemberRegistry;
use crate::sink::DistributionSink;
use council_types::{
    Address, AllocationView, BudgetAllocation, CouncilError, CouncilEvent, CouncilId,
    CouncilInfo, CouncilResult, GranteeRecord, LoggedEvent, MemberRecord, PoolId, Role, TxHash,
    Units, DEFAULT_MAX_ALLOCATIONS_PER_MEMBER, MAX_ALLOCATIONS_PER_MEMBER, VOTING_TOKEN_DECIMALS,
};
use tracing::{debug, info, warn};

pub struct Council<S: DistributionSink> {
    info: CouncilInfo,
    access: AccessControl,
    members: MemberRegistry,
    grantees: GranteeRegistry,
    ledger: AllocationLedger,
    sink: S,
}

impl<S: DistributionSink> Council<S> {
    /// Create a council whose pool streams `distribution_token`.
    ///
    /// `admin` receives every role. No event is logged; councils created
    /// through [`crate::CouncilFactory`] get a `CouncilCreated` transaction.
    pub fn new(
        id: CouncilId,
        council_name: impl Into<String>,
        council_symbol: impl Into<String>,
        distribution_token: Address,
        admin: Address,
        sink: S,
    ) -> CouncilResult<Self> {
        let mut council = Self::open(id, council_name, council_symbol, distribution_token, sink)?;
        council.access = AccessControl::with_admin(admin);
        Ok(council)
    }

    /// Council with a fresh pool and an empty role table
    pub(crate) fn open(
        id: CouncilId,
        council_name: impl Into<String>,
        council_symbol: impl Into<String>,
        distribution_token: Address,
        mut sink: S,
    ) -> CouncilResult<Self> {
        let pool = sink.create_pool(&distribution_token, &id.address())?;
        Ok(Self {
            info: CouncilInfo {
                id,
                council_name: council_name.into(),
                council_symbol: council_symbol.into(),
                distribution_token,
                pool,
                max_allocations_per_member: DEFAULT_MAX_ALLOCATIONS_PER_MEMBER,
            },
            access: AccessControl::new(),
            members: MemberRegistry::new(),
            grantees: GranteeRegistry::new(id),
            ledger: AllocationLedger::new(),
            sink,
        })
    }

    /// Rebuild a council by re-executing its logged transactions.
    ///
    /// Events of other councils are ignored. Share updates are pushed into
    /// `sink`, so the rebuilt pool matches the recorded one.
    pub fn restore(council: CouncilId, events: &[LoggedEvent], sink: S) -> CouncilResult<Self> {
        let mut ordered: Vec<&LoggedEvent> =
            events.iter().filter(|e| e.council == council).collect();
        ordered.sort_by_key(|e| e.position);

        let start = ordered
            .iter()
            .position(|e| matches!(e.event, CouncilEvent::CouncilCreated { .. }))
            .ok_or(CouncilError::CouncilNotFound(council))?;

        let mut restored = match &ordered[start].event {
            CouncilEvent::CouncilCreated {
                pool,
                council_name,
                council_symbol,
                distribution_token,
                ..
            } => {
                let restored = Self::open(
                    council,
                    council_name.clone(),
                    council_symbol.clone(),
                    *distribution_token,
                    sink,
                )?;
                if restored.info.pool != *pool {
                    warn!(
                        council = %council,
                        recorded = %pool,
                        restored = %restored.info.pool,
                        "Restored pool differs from recorded pool"
                    );
                }
                restored
            }
            _ => return Err(CouncilError::CouncilNotFound(council)),
        };

        for logged in &ordered[start + 1..] {
            restored.replay(&logged.event)?;
        }

        debug!(
            council = %council,
            events = ordered.len() - start,
            "Council restored from event log"
        );
        Ok(restored)
    }

    fn replay(&mut self, event: &CouncilEvent) -> CouncilResult<()> {
        match event {
            CouncilEvent::CouncilCreated { .. } => {
                warn!(council = %self.info.id, "Duplicate CouncilCreated ignored");
            }
            CouncilEvent::MemberAdded {
                account,
                voting_power,
            } => {
                self.stage_add_member(*account, *voting_power)?;
            }
            CouncilEvent::MemberRemoved { account } => {
                self.stage_remove_member(account)?;
            }
            CouncilEvent::GranteeAdded { name, account } => {
                self.stage_add_grantee(name, *account)?;
            }
            CouncilEvent::GranteeRemoved { account } => {
                self.stage_remove_grantee(account)?;
            }
            CouncilEvent::BudgetAllocated { member, allocation } => {
                self.stage_allocate(member, allocation)?;
            }
            CouncilEvent::MaxAllocationsPerMemberSet {
                max_allocations_per_member,
            } => {
                self.stage_set_max_allocations(*max_allocations_per_member)?;
            }
            CouncilEvent::Withdrawn { .. } => {}
            CouncilEvent::RoleGranted { role, account, .. } => {
                self.access.grant(*role, *account);
            }
            CouncilEvent::RoleRevoked { role, account, .. } => {
                self.access.revoke(*role, account);
            }
        }
        Ok(())
    }

    // --- Member operations ---

    /// Add a council member (requires [`Role::MemberManager`])
    pub fn add_member(
        &mut self,
        caller: &Address,
        account: Address,
        voting_power: Units,
        log: &mut EventLog,
    ) -> CouncilResult<TxHash> {
        self.authorize(caller, Role::MemberManager, "add_member")?;
        let event = self
            .stage_add_member(account, voting_power)
            .map_err(|e| self.rejected("add_member", caller, e))?;

        info!(
            council = %self.info.id,
            member = %account,
            voting_power = %voting_power,
            "Council member added"
        );
        Ok(log.commit(self.info.id, vec![event]))
    }

    /// Remove a member, clearing its allocation and the shares it funded
    pub fn remove_member(
        &mut self,
        caller: &Address,
        account: &Address,
        log: &mut EventLog,
    ) -> CouncilResult<TxHash> {
        self.authorize(caller, Role::MemberManager, "remove_member")?;
        let event = self
            .stage_remove_member(account)
            .map_err(|e| self.rejected("remove_member", caller, e))?;

        info!(
            council = %self.info.id,
            member = %account,
            total_allocated = %self.ledger.total_allocated(),
            "Council member removed"
        );
        Ok(log.commit(self.info.id, vec![event]))
    }

    pub(crate) fn stage_add_member(
        &mut self,
        account: Address,
        voting_power: Units,
    ) -> CouncilResult<CouncilEvent> {
        self.members.add(account, voting_power)?;
        Ok(CouncilEvent::MemberAdded {
            account,
            voting_power,
        })
    }

    fn stage_remove_member(&mut self, account: &Address) -> CouncilResult<CouncilEvent> {
        self.members.check_remove(account)?;
        let update = self.ledger.plan_member_removal(account);
        self.push_shares(&update)?;

        self.members.remove(account)?;
        self.ledger.apply(update);
        Ok(CouncilEvent::MemberRemoved { account: *account })
    }

    // --- Grantee operations ---

    /// Add a grantee (requires [`Role::GranteeManager`])
    pub fn add_grantee(
        &mut self,
        caller: &Address,
        name: &str,
        account: Address,
        log: &mut EventLog,
    ) -> CouncilResult<TxHash> {
        self.authorize(caller, Role::GranteeManager, "add_grantee")?;
        let event = self
            .stage_add_grantee(name, account)
            .map_err(|e| self.rejected("add_grantee", caller, e))?;

        info!(
            council = %self.info.id,
            grantee = %account,
            name = name,
            "Grantee added"
        );
        Ok(log.commit(self.info.id, vec![event]))
    }

    /// Remove a grantee, dropping it from every member's allocation
    pub fn remove_grantee(
        &mut self,
        caller: &Address,
        account: &Address,
        log: &mut EventLog,
    ) -> CouncilResult<TxHash> {
        self.authorize(caller, Role::GranteeManager, "remove_grantee")?;
        let event = self
            .stage_remove_grantee(account)
            .map_err(|e| self.rejected("remove_grantee", caller, e))?;

        info!(
            council = %self.info.id,
            grantee = %account,
            total_allocated = %self.ledger.total_allocated(),
            "Grantee removed"
        );
        Ok(log.commit(self.info.id, vec![event]))
    }

    pub(crate) fn stage_add_grantee(
        &mut self,
        name: &str,
        account: Address,
    ) -> CouncilResult<CouncilEvent> {
        self.grantees.add(name, account)?;
        Ok(CouncilEvent::GranteeAdded {
            name: name.to_string(),
            account,
        })
    }

    fn stage_remove_grantee(&mut self, account: &Address) -> CouncilResult<CouncilEvent> {
        let id = self.grantees.resolve_active(account)?;
        let update = self.ledger.plan_grantee_removal(&id);
        self.push_shares(&update)?;

        self.grantees.remove(account)?;
        self.ledger.apply(update);
        Ok(CouncilEvent::GranteeRemoved { account: *account })
    }

    // --- Allocation ---

    /// Replace the caller's budget allocation.
    ///
    /// The caller must be an enabled member; the request is validated as a
    /// whole and either fully applied or rejected.
    pub fn allocate(
        &mut self,
        caller: &Address,
        allocation: BudgetAllocation,
        log: &mut EventLog,
    ) -> CouncilResult<TxHash> {
        let event = self
            .stage_allocate(caller, &allocation)
            .map_err(|e| self.rejected("allocate", caller, e))?;

        info!(
            council = %self.info.id,
            member = %caller,
            grantees = allocation.accounts.len(),
            allocated = %self.ledger.row(caller).map(|r| r.total()).unwrap_or(0),
            total_allocated = %self.ledger.total_allocated(),
            "Budget allocated"
        );
        Ok(log.commit(self.info.id, vec![event]))
    }

    fn stage_allocate(
        &mut self,
        member: &Address,
        allocation: &BudgetAllocation,
    ) -> CouncilResult<CouncilEvent> {
        if !self.members.is_member(member) {
            return Err(CouncilError::MemberNotFound(*member));
        }

        let grantees = &self.grantees;
        let row = AllocationLedger::validate(
            allocation,
            self.members.voting_power(member),
            self.info.max_allocations_per_member,
            |account| grantees.resolve_active(account),
        )?;

        let update = self.ledger.plan_allocation(*member, row);
        self.push_shares(&update)?;
        self.ledger.apply(update);

        Ok(CouncilEvent::BudgetAllocated {
            member: *member,
            allocation: allocation.clone(),
        })
    }

    // --- Administration ---

    /// Change the per-member grantee cap (requires [`Role::Admin`]).
    ///
    /// Existing allocations above a lowered cap are kept; the cap applies
    /// to the next `allocate` of each member.
    pub fn set_max_allocations_per_member(
        &mut self,
        caller: &Address,
        max_allocations_per_member: u8,
        log: &mut EventLog,
    ) -> CouncilResult<TxHash> {
        self.authorize(caller, Role::Admin, "set_max_allocations_per_member")?;
        let event = self
            .stage_set_max_allocations(max_allocations_per_member)
            .map_err(|e| self.rejected("set_max_allocations_per_member", caller, e))?;

        info!(
            council = %self.info.id,
            max_allocations_per_member,
            "Max allocations per member set"
        );
        Ok(log.commit(self.info.id, vec![event]))
    }

    pub(crate) fn stage_set_max_allocations(&mut self, max: u8) -> CouncilResult<CouncilEvent> {
        if max == 0 || max > MAX_ALLOCATIONS_PER_MEMBER {
            return Err(CouncilError::InvalidMaxAllocations {
                requested: max,
                max: MAX_ALLOCATIONS_PER_MEMBER,
            });
        }
        self.info.max_allocations_per_member = max;
        Ok(CouncilEvent::MaxAllocationsPerMemberSet {
            max_allocations_per_member: max,
        })
    }

    /// Sweep the council's whole balance of `token` to the admin caller
    pub fn withdraw<C: TokenCustody>(
        &mut self,
        caller: &Address,
        token: &Address,
        custody: &mut C,
        log: &mut EventLog,
    ) -> CouncilResult<Units> {
        self.authorize(caller, Role::Admin, "withdraw")?;

        let holder = self.info.id.address();
        let amount = custody.balance_of(token, &holder);
        if amount == 0 {
            return Err(self.rejected("withdraw", caller, CouncilError::NothingToWithdraw(*token)));
        }
        custody
            .transfer(token, &holder, caller, amount)
            .map_err(|e| self.rejected("withdraw", caller, e.into()))?;

        info!(
            council = %self.info.id,
            token = %token,
            account = %caller,
            amount = %amount,
            "Withdrawn"
        );
        log.commit(
            self.info.id,
            vec![CouncilEvent::Withdrawn {
                token: *token,
                account: *caller,
                amount,
            }],
        );
        Ok(amount)
    }

    /// Grant `role` to `account` (requires [`Role::Admin`]).
    ///
    /// Returns false, logging nothing, if the account already held it.
    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
        log: &mut EventLog,
    ) -> CouncilResult<bool> {
        self.authorize(caller, Role::Admin, "grant_role")?;
        match self.stage_grant_role(role, account, *caller) {
            Some(event) => {
                info!(council = %self.info.id, role = %role, account = %account, "Role granted");
                log.commit(self.info.id, vec![event]);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Revoke `role` from `account` (requires [`Role::Admin`])
    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
        log: &mut EventLog,
    ) -> CouncilResult<bool> {
        self.authorize(caller, Role::Admin, "revoke_role")?;
        if !self.access.revoke(role, account) {
            return Ok(false);
        }

        info!(council = %self.info.id, role = %role, account = %account, "Role revoked");
        log.commit(
            self.info.id,
            vec![CouncilEvent::RoleRevoked {
                role,
                account: *account,
                sender: *caller,
            }],
        );
        Ok(true)
    }

    pub(crate) fn stage_grant_role(
        &mut self,
        role: Role,
        account: Address,
        sender: Address,
    ) -> Option<CouncilEvent> {
        self.access.grant(role, account).then_some(CouncilEvent::RoleGranted {
            role,
            account,
            sender,
        })
    }

    // --- Queries ---

    pub fn info(&self) -> &CouncilInfo {
        &self.info
    }

    pub fn id(&self) -> CouncilId {
        self.info.id
    }

    pub fn pool(&self) -> PoolId {
        self.info.pool
    }

    /// A member's current allocation; empty for non-members
    pub fn get_allocation(&self, member: &Address) -> AllocationView {
        if !self.members.is_member(member) {
            return AllocationView::default();
        }
        let row = self.ledger.row(member);
        AllocationView {
            allocation: row.map(|r| r.to_budget_allocation()).unwrap_or_default(),
            total_allocated: row.map(|r| r.total()).unwrap_or(0),
            voting_power: self.members.voting_power(member),
        }
    }

    pub fn is_member(&self, account: &Address) -> bool {
        self.members.is_member(account)
    }

    pub fn is_grantee(&self, account: &Address) -> bool {
        self.grantees.is_grantee(account)
    }

    pub fn voting_power(&self, account: &Address) -> Units {
        self.members.voting_power(account)
    }

    /// Voting token balance, equal to voting power
    pub fn balance_of(&self, account: &Address) -> Units {
        self.voting_power(account)
    }

    pub fn total_supply(&self) -> Units {
        self.members.total_supply()
    }

    pub fn decimals(&self) -> u8 {
        VOTING_TOKEN_DECIMALS
    }

    pub fn max_allocations_per_member(&self) -> u8 {
        self.info.max_allocations_per_member
    }

    /// Sum of every member's allocation
    pub fn total_allocated(&self) -> Units {
        self.ledger.total_allocated()
    }

    /// Aggregate currently allocated to the enabled grantee at `account`
    pub fn grantee_units(&self, account: &Address) -> Units {
        self.grantees
            .resolve_active(account)
            .map(|id| self.ledger.units_of(&id))
            .unwrap_or(0)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.access.has_role(role, account)
    }

    pub fn members(&self) -> Vec<&MemberRecord> {
        self.members.active_members()
    }

    pub fn grantees(&self) -> Vec<&GranteeRecord> {
        self.grantees.active_grantees()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // --- Internals ---

    fn authorize(&self, caller: &Address, role: Role, operation: &'static str) -> CouncilResult<()> {
        self.access
            .require(caller, role)
            .map_err(|e| self.rejected(operation, caller, e))
    }

    fn rejected(&self, operation: &'static str, caller: &Address, err: CouncilError) -> CouncilError {
        warn!(
            council = %self.info.id,
            operation,
            caller = %caller,
            error = %err,
            "Council operation rejected"
        );
        err
    }

    /// Push staged share changes, restoring earlier pushes if one fails
    fn push_shares(&mut self, update: &LedgerUpdate) -> CouncilResult<()> {
        let pool = self.info.pool;
        for (pushed, change) in update.shares.iter().enumerate() {
            if let Err(err) = self.sink.set_share(&pool, &change.grantee.account, change.after) {
                self.restore_shares(&update.shares[..pushed]);
                return Err(err.into());
            }
            debug!(
                council = %self.info.id,
                grantee = %change.grantee,
                before = %change.before,
                after = %change.after,
                "Share pushed"
            );
        }
        Ok(())
    }

    fn restore_shares(&mut self, pushed: &[ShareChange]) {
        let pool = self.info.pool;
        for change in pushed.iter().rev() {
            if let Err(err) = self.sink.set_share(&pool, &change.grantee.account, change.before) {
                warn!(
                    council = %self.info.id,
                    grantee = %change.grantee,
                    error = %err,
                    "Failed to restore share after sink failure"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemoryPool;

    fn admin() -> Address {
        Address::from_low_u64(1)
    }

    fn council() -> Council<InMemoryPool> {
        Council::new(
            CouncilId::new(Address::from_low_u64(0xc0)),
            "Spacing Guild",
            "SPA",
            Address::from_low_u64(0xe7),
            admin(),
            InMemoryPool::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_council_defaults() {
        let council = council();
        assert_eq!(council.max_allocations_per_member(), 10);
        assert_eq!(council.decimals(), 0);
        assert_eq!(council.total_supply(), 0);
        assert!(council.has_role(Role::Admin, &admin()));
        assert_eq!(council.sink().pool_count(), 1);
    }

    #[test]
    fn test_zero_token_rejected() {
        let result = Council::new(
            CouncilId::new(Address::from_low_u64(0xc0)),
            "Guild",
            "GLD",
            Address::ZERO,
            admin(),
            InMemoryPool::new(),
        );
        assert!(matches!(result, Err(CouncilError::Sink(_))));
    }

    #[test]
    fn test_failed_operation_logs_nothing() {
        let mut council = council();
        let mut log = EventLog::new();
        let outsider = Address::from_low_u64(2);

        let result = council.add_member(&outsider, Address::from_low_u64(3), 10, &mut log);
        assert!(matches!(result, Err(CouncilError::Unauthorized { .. })));
        assert!(log.is_empty());
        assert!(!council.is_member(&Address::from_low_u64(3)));
    }

    #[test]
    fn test_voting_token_view() {
        let mut council = council();
        let mut log = EventLog::new();
        council
            .add_member(&admin(), Address::from_low_u64(3), 40, &mut log)
            .unwrap();
        council
            .add_member(&admin(), Address::from_low_u64(4), 60, &mut log)
            .unwrap();

        assert_eq!(council.balance_of(&Address::from_low_u64(3)), 40);
        assert_eq!(council.total_supply(), 100);
        assert_eq!(council.members().len(), 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_grant_role_is_idempotent() {
        let mut council = council();
        let mut log = EventLog::new();
        let manager = Address::from_low_u64(5);

        assert!(council
            .grant_role(&admin(), Role::MemberManager, manager, &mut log)
            .unwrap());
        assert!(!council
            .grant_role(&admin(), Role::MemberManager, manager, &mut log)
            .unwrap());
        assert_eq!(log.len(), 1);
    }
}
