//! In-memory native currency.

use crate::ports::NativeBank;
use parking_lot::RwLock;
use shared_types::{short_hex, Address, Amount, TransferError};
use std::collections::HashMap;
use tracing::trace;

/// Account balances of one chain, held in memory.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    balances: RwLock<HashMap<Address, Amount>>,
}

impl InMemoryBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bank with opening balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, Amount)>) -> Self {
        Self {
            balances: RwLock::new(balances.into_iter().collect()),
        }
    }

    /// Credit `amount` out of thin air (genesis, faucets, tests).
    pub fn mint(&self, account: Address, amount: Amount) {
        let mut balances = self.balances.write();
        let entry = balances.entry(account).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.balances
            .read()
            .values()
            .fold(0, |acc, v| acc.saturating_add(*v))
    }
}

impl NativeBank for InMemoryBank {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.read().get(account).copied().unwrap_or(0)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut balances = self.balances.write();
        let balance = balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(TransferError::InsufficientBalance {
                account: *from,
                balance,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("recipient balance overflow".into()))?;

        balances.insert(*from, balance - amount);
        balances.insert(*to, credited);
        trace!(from = %short_hex(from), to = %short_hex(to), amount, "Transfer");
        Ok(())
    }
}
