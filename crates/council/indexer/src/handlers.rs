//! One apply function per event type.
//!
//! Handlers are idempotent and never fail: a reference to an entity the
//! model has not seen is logged and the event is skipped.

use crate::model::{
    AllocationEntity, AllocationId, CouncilEntity, CouncilMemberEntity, GranteeEntity,
};
use crate::store::ReadModel;
use council_types::{
    Address, BudgetAllocation, CouncilEvent, CouncilId, GranteeId, LoggedEvent, MemberKey,
    PoolId, Units, DEFAULT_MAX_ALLOCATIONS_PER_MEMBER,
};
use tracing::{debug, warn};

pub(crate) fn apply(model: &mut ReadModel, logged: &LoggedEvent) {
    match &logged.event {
        CouncilEvent::CouncilCreated {
            council,
            pool,
            council_name,
            council_symbol,
            distribution_token,
        } => council_created(
            model,
            logged,
            *council,
            *pool,
            council_name,
            council_symbol,
            *distribution_token,
        ),
        CouncilEvent::MemberAdded {
            account,
            voting_power,
        } => member_added(model, logged.council, *account, *voting_power),
        CouncilEvent::MemberRemoved { account } => member_removed(model, logged.council, account),
        CouncilEvent::GranteeAdded { name, account } => {
            grantee_added(model, logged.council, name, *account)
        }
        CouncilEvent::GranteeRemoved { account } => {
            grantee_removed(model, logged.council, account)
        }
        CouncilEvent::BudgetAllocated { member, allocation } => {
            budget_allocated(model, logged, member, allocation)
        }
        CouncilEvent::MaxAllocationsPerMemberSet {
            max_allocations_per_member,
        } => max_allocations_set(model, logged.council, *max_allocations_per_member),
        CouncilEvent::Withdrawn { .. }
        | CouncilEvent::RoleGranted { .. }
        | CouncilEvent::RoleRevoked { .. } => {
            debug!(
                council = %logged.council,
                event = logged.event.name(),
                "Event not indexed"
            );
        }
    }
}

fn council_created(
    model: &mut ReadModel,
    logged: &LoggedEvent,
    council: CouncilId,
    pool: PoolId,
    council_name: &str,
    council_symbol: &str,
    distribution_token: Address,
) {
    // A replayed creation keeps any cap set since
    let max_allocations_per_member = model
        .councils
        .get(&council)
        .map(|c| c.max_allocations_per_member)
        .unwrap_or(DEFAULT_MAX_ALLOCATIONS_PER_MEMBER);

    model.councils.insert(
        council,
        CouncilEntity {
            id: council,
            council_name: council_name.to_string(),
            council_symbol: council_symbol.to_string(),
            pool,
            distribution_token,
            max_allocations_per_member,
            created_at: logged.position.timestamp,
        },
    );
}

fn member_added(model: &mut ReadModel, council: CouncilId, account: Address, voting_power: Units) {
    let id = MemberKey::new(council, account);
    model.members.insert(
        id,
        CouncilMemberEntity {
            id,
            council,
            account,
            voting_power,
            enabled: true,
        },
    );
}

fn member_removed(model: &mut ReadModel, council: CouncilId, account: &Address) {
    let id = MemberKey::new(council, *account);
    match model.members.get_mut(&id) {
        Some(member) => {
            member.voting_power = 0;
            member.enabled = false;
        }
        None => warn!(member = %id, "Council member not found, skipping removal"),
    }
}

fn grantee_added(model: &mut ReadModel, council: CouncilId, name: &str, account: Address) {
    let current = model.current_grantees.get(&(council, account)).copied();

    // Same enabled generation: a redelivered add only refreshes the name
    if let Some(id) = current {
        if let Some(grantee) = model.grantees.get_mut(&id).filter(|g| g.enabled) {
            grantee.name = name.to_string();
            return;
        }
    }

    let id = match current {
        Some(previous) => previous.next_generation(),
        None => GranteeId::new(council, account, 0),
    };
    model.grantees.insert(
        id,
        GranteeEntity {
            id,
            council,
            name: name.to_string(),
            account,
            enabled: true,
        },
    );
    model.current_grantees.insert((council, account), id);
}

fn grantee_removed(model: &mut ReadModel, council: CouncilId, account: &Address) {
    let current = model.current_grantees.get(&(council, *account)).copied();
    match current.and_then(|id| model.grantees.get_mut(&id)) {
        Some(grantee) => grantee.enabled = false,
        None => warn!(
            council = %council,
            grantee = %account,
            "Grantee not found, skipping removal"
        ),
    }
}

fn budget_allocated(
    model: &mut ReadModel,
    logged: &LoggedEvent,
    member: &Address,
    allocation: &BudgetAllocation,
) {
    let council = logged.council;
    let council_member = MemberKey::new(council, *member);
    if !model.members.contains_key(&council_member) {
        warn!(member = %council_member, "Council member not found, skipping allocation");
        return;
    }

    let mut grantees = Vec::with_capacity(allocation.accounts.len());
    for account in &allocation.accounts {
        match model.current_grantees.get(&(council, *account)) {
            Some(id) => grantees.push(*id),
            None => {
                warn!(
                    council = %council,
                    grantee = %account,
                    "Not all grantees found, skipping allocation"
                );
                return;
            }
        }
    }

    let id = AllocationId::new(logged.tx_hash, logged.position.log_index);
    model.allocations.insert(
        id,
        AllocationEntity {
            id,
            council,
            council_member,
            allocated_at: logged.position.timestamp,
            position: logged.position,
            grantees,
            amounts: allocation.amounts.clone(),
        },
    );
}

fn max_allocations_set(model: &mut ReadModel, council: CouncilId, max: u8) {
    if let Some(entity) = model.councils.get_mut(&council) {
        entity.max_allocations_per_member = max;
    }
}
