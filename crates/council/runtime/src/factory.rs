//! Council Factory - deploys councils from a [`CouncilConfig`]
//!
//! Creation is one transaction: `CouncilCreated` first, then the role grants
//! to the creator, the optional cap override, and every seeded member and
//! grantee. If any seed entry is invalid nothing is logged.

use crate::council::Council;
use crate::event_log::EventLog;
use crate::sink::DistributionSink;
use council_types::{Address, CouncilConfig, CouncilEvent, CouncilId, CouncilResult, Role};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct CouncilFactory {
    address: Address,
    nonce: u64,
}

impl CouncilFactory {
    pub fn new(address: Address) -> Self {
        Self { address, nonce: 0 }
    }

    /// Factory that has already deployed `nonce` councils
    pub fn with_nonce(address: Address, nonce: u64) -> Self {
        Self { address, nonce }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn councils_created(&self) -> u64 {
        self.nonce
    }

    /// Address the next council will be deployed at
    pub fn next_council_id(&self) -> CouncilId {
        let mut seed = Vec::with_capacity(28);
        seed.extend_from_slice(self.address.as_bytes());
        seed.extend_from_slice(&self.nonce.to_be_bytes());
        CouncilId::new(Address::derive(&seed))
    }

    /// Create a council administered by `creator`
    pub fn create_council<S: DistributionSink>(
        &mut self,
        creator: &Address,
        config: &CouncilConfig,
        sink: S,
        log: &mut EventLog,
    ) -> CouncilResult<Council<S>> {
        let id = self.next_council_id();
        let (council, events) = self.build(id, creator, config, sink).map_err(|e| {
            warn!(
                factory = %self.address,
                council_name = %config.council_name,
                error = %e,
                "Council creation rejected"
            );
            e
        })?;

        self.nonce += 1;
        log.commit(id, events);

        info!(
            council = %id,
            pool = %council.pool(),
            council_name = %config.council_name,
            members = config.council_members.len(),
            grantees = config.grantees.len(),
            "Council created"
        );
        Ok(council)
    }

    fn build<S: DistributionSink>(
        &self,
        id: CouncilId,
        creator: &Address,
        config: &CouncilConfig,
        sink: S,
    ) -> CouncilResult<(Council<S>, Vec<CouncilEvent>)> {
        let mut council = Council::open(
            id,
            config.council_name.clone(),
            config.council_symbol.clone(),
            config.distribution_token,
            sink,
        )?;

        let mut events = vec![CouncilEvent::CouncilCreated {
            council: id,
            pool: council.pool(),
            council_name: config.council_name.clone(),
            council_symbol: config.council_symbol.clone(),
            distribution_token: config.distribution_token,
        }];

        for role in Role::ALL {
            events.extend(council.stage_grant_role(role, *creator, self.address));
        }
        if let Some(max) = config.max_allocations_per_member {
            events.push(council.stage_set_max_allocations(max)?);
        }
        for member in &config.council_members {
            events.push(council.stage_add_member(member.account, member.voting_power_units())?);
        }
        for grantee in &config.grantees {
            events.push(council.stage_add_grantee(&grantee.name, grantee.account)?);
        }

        Ok((council, events))
    }
}
