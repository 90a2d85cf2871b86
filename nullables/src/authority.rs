//! Nullable authority check that allows everyone except an explicit deny list.

use stakepoll_types::{Address, AuthorityCheck, CallContext};
use std::cell::RefCell;
use std::collections::HashSet;

pub struct NullAuthority {
    denied: RefCell<HashSet<Address>>,
}

impl NullAuthority {
    /// Every account is authorised.
    pub fn allow_all() -> Self {
        Self {
            denied: RefCell::new(HashSet::new()),
        }
    }

    /// Make every subsequent check for `account` fail.
    pub fn deny(&self, account: &Address) {
        self.denied.borrow_mut().insert(account.clone());
    }

    pub fn allow(&self, account: &Address) {
        self.denied.borrow_mut().remove(account);
    }
}

impl Default for NullAuthority {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl AuthorityCheck for NullAuthority {
    fn has_authority(&self, account: &Address, _context: &CallContext<'_>) -> bool {
        !self.denied.borrow().contains(account)
    }
}
