//! Token custody - balances of stray tokens the council can sweep

use council_types::{Address, CustodyError, Units};
use std::collections::HashMap;

/// Token balance and transfer interface used by `withdraw`
pub trait TokenCustody {
    fn balance_of(&self, token: &Address, holder: &Address) -> Units;

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Units,
    ) -> Result<(), CustodyError>;
}

/// In-memory balances keyed by (token, holder)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustody {
    balances: HashMap<(Address, Address), Units>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `holder` with freshly minted `amount` of `token`
    pub fn mint(&mut self, token: Address, holder: Address, amount: Units) {
        let balance = self.balances.entry((token, holder)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl TokenCustody for InMemoryCustody {
    fn balance_of(&self, token: &Address, holder: &Address) -> Units {
        self.balances.get(&(*token, *holder)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Units,
    ) -> Result<(), CustodyError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                token: *token,
                holder: *from,
                required: amount,
                available,
            });
        }
        self.balances.insert((*token, *from), available - amount);
        self.mint(*token, *to, amount);
        Ok(())
    }
}
