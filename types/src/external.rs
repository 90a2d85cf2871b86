//! Interfaces to the collaborators the ledger does not own.
//!
//! All calls are synchronous and are made from within a single operation;
//! the host serialises operations, so implementations need no locking of
//! their own beyond what their backing state requires.

use crate::{Address, Choice, PollId, PollParams, Timestamp};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of stake balances (the external token).
pub trait StakeOracle {
    /// Current balance of `account`.
    fn balance_of(&self, account: &Address) -> u64;

    /// Current total supply.
    fn total_supply(&self) -> u64;
}

/// The operation an authority check is being asked about.
#[derive(Clone, Copy, Debug)]
pub enum CallContext<'a> {
    CreatePoll(&'a PollParams),
    Vote {
        poll_id: PollId,
        choice: Option<Choice>,
    },
}

/// Proof-of-authority check for an account.
pub trait AuthorityCheck {
    /// Whether `account` authorised the call described by `context`.
    fn has_authority(&self, account: &Address, context: &CallContext<'_>) -> bool;
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Timestamp::new(secs)
    }
}
