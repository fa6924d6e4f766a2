//! Distribution Sink - the streaming pool the ledger pushes shares into
//!
//! The streaming protocol itself is external. The council only needs to
//! create a pool for its distribution token and set each grantee's unit
//! share; flow rates follow from those units on the other side.

use council_types::{Address, PoolId, SinkError, Units};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Unit-share pool interface consumed by the allocation ledger
pub trait DistributionSink {
    /// Create a pool streaming `token`, administered by `admin`
    fn create_pool(&mut self, token: &Address, admin: &Address) -> Result<PoolId, SinkError>;

    /// Set `account`'s proportional claim on the pool to `units`
    fn set_share(&mut self, pool: &PoolId, account: &Address, units: Units)
        -> Result<(), SinkError>;

    fn units_of(&self, pool: &PoolId, account: &Address) -> Units;

    fn total_units(&self, pool: &PoolId) -> Units;
}

/// In-memory pool used for tests, local tooling, and embedding
#[derive(Debug, Default)]
pub struct InMemoryPool {
    pools: HashMap<PoolId, BTreeMap<Address, Units>>,
    created: u64,
    rejected: HashSet<Address>,
}

impl InMemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future share update for `account` fail
    pub fn reject_updates_for(&mut self, account: Address) {
        self.rejected.insert(account);
    }

    pub fn accept_updates_for(&mut self, account: &Address) {
        self.rejected.remove(account);
    }

    /// Accounts with a non-zero share in `pool`
    pub fn members(&self, pool: &PoolId) -> Vec<(Address, Units)> {
        self.pools
            .get(pool)
            .map(|shares| shares.iter().map(|(a, u)| (*a, *u)).collect())
            .unwrap_or_default()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl DistributionSink for InMemoryPool {
    fn create_pool(&mut self, token: &Address, admin: &Address) -> Result<PoolId, SinkError> {
        if token.is_zero() {
            return Err(SinkError::InvalidToken);
        }

        let mut seed = Vec::with_capacity(48);
        seed.extend_from_slice(token.as_bytes());
        seed.extend_from_slice(admin.as_bytes());
        seed.extend_from_slice(&self.created.to_be_bytes());
        self.created += 1;

        let pool = PoolId::new(Address::derive(&seed));
        self.pools.insert(pool, BTreeMap::new());
        debug!(pool = %pool, token = %token, admin = %admin, "Pool created");
        Ok(pool)
    }

    fn set_share(
        &mut self,
        pool: &PoolId,
        account: &Address,
        units: Units,
    ) -> Result<(), SinkError> {
        if self.rejected.contains(account) {
            return Err(SinkError::Rejected {
                account: *account,
                reason: "updates disabled for account".into(),
            });
        }

        let shares = self
            .pools
            .get_mut(pool)
            .ok_or(SinkError::PoolNotFound(*pool))?;

        if units == 0 {
            shares.remove(account);
        } else {
            shares.insert(*account, units);
        }

        debug!(pool = %pool, account = %account, units = %units, "Share updated");
        Ok(())
    }

    fn units_of(&self, pool: &PoolId, account: &Address) -> Units {
        self.pools
            .get(pool)
            .and_then(|shares| shares.get(account).copied())
            .unwrap_or(0)
    }

    fn total_units(&self, pool: &PoolId) -> Units {
        self.pools
            .get(pool)
            .map(|shares| shares.values().sum())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Address {
        Address::from_low_u64(0xe7)
    }

    #[test]
    fn test_create_pool_rejects_zero_token() {
        let mut sink = InMemoryPool::new();
        let result = sink.create_pool(&Address::ZERO, &Address::from_low_u64(1));
        assert_eq!(result, Err(SinkError::InvalidToken));
        assert_eq!(sink.pool_count(), 0);
    }

    #[test]
    fn test_pools_are_distinct() {
        let mut sink = InMemoryPool::new();
        let admin = Address::from_low_u64(1);
        let a = sink.create_pool(&token(), &admin).unwrap();
        let b = sink.create_pool(&token(), &admin).unwrap();
        assert_ne!(a, b);
        assert_eq!(sink.pool_count(), 2);
    }

    #[test]
    fn test_set_and_clear_shares() {
        let mut sink = InMemoryPool::new();
        let pool = sink.create_pool(&token(), &Address::from_low_u64(1)).unwrap();
        let g1 = Address::from_low_u64(10);
        let g2 = Address::from_low_u64(11);

        sink.set_share(&pool, &g1, 30).unwrap();
        sink.set_share(&pool, &g2, 70).unwrap();
        assert_eq!(sink.units_of(&pool, &g1), 30);
        assert_eq!(sink.total_units(&pool), 100);

        sink.set_share(&pool, &g1, 0).unwrap();
        assert_eq!(sink.units_of(&pool, &g1), 0);
        assert_eq!(sink.members(&pool), vec![(g2, 70)]);
    }

    #[test]
    fn test_rejected_updates() {
        let mut sink = InMemoryPool::new();
        let pool = sink.create_pool(&token(), &Address::from_low_u64(1)).unwrap();
        let g = Address::from_low_u64(10);

        sink.reject_updates_for(g);
        assert!(matches!(
            sink.set_share(&pool, &g, 5),
            Err(SinkError::Rejected { .. })
        ));

        sink.accept_updates_for(&g);
        assert!(sink.set_share(&pool, &g, 5).is_ok());
    }

    #[test]
    fn test_unknown_pool() {
        let mut sink = InMemoryPool::new();
        let pool = PoolId::new(Address::from_low_u64(5));
        assert_eq!(
            sink.set_share(&pool, &Address::from_low_u64(1), 1),
            Err(SinkError::PoolNotFound(pool))
        );
        assert_eq!(sink.total_units(&pool), 0);
    }
}
