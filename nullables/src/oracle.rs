//! Nullable stake oracle with balances set by the test.

use stakepoll_types::{Address, StakeOracle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// An in-memory token: unknown accounts hold zero.
pub struct NullStakeOracle {
    balances: RefCell<HashMap<Address, u64>>,
    total_supply: Cell<u64>,
    balance_queries: Cell<u64>,
}

impl NullStakeOracle {
    pub fn new(total_supply: u64) -> Self {
        Self {
            balances: RefCell::new(HashMap::new()),
            total_supply: Cell::new(total_supply),
            balance_queries: Cell::new(0),
        }
    }

    pub fn set_balance(&self, account: &Address, balance: u64) {
        self.balances.borrow_mut().insert(account.clone(), balance);
    }

    pub fn set_total_supply(&self, supply: u64) {
        self.total_supply.set(supply);
    }

    /// How many times `balance_of` has been called.
    pub fn balance_queries(&self) -> u64 {
        self.balance_queries.get()
    }
}

impl Default for NullStakeOracle {
    fn default() -> Self {
        Self::new(0)
    }
}

impl StakeOracle for NullStakeOracle {
    fn balance_of(&self, account: &Address) -> u64 {
        self.balance_queries.set(self.balance_queries.get() + 1);
        self.balances.borrow().get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u64 {
        self.total_supply.get()
    }
}
