//! Nullable clock: time is whatever the test says it is.

use stakepoll_types::{Clock, Timestamp};
use std::cell::Cell;

/// A manually driven clock.
pub struct NullClock {
    now: Cell<Timestamp>,
}

impl NullClock {
    pub fn new(secs: u64) -> Self {
        Self {
            now: Cell::new(Timestamp::new(secs)),
        }
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        let next = self.now.get().as_secs().saturating_add(secs);
        self.now.set(Timestamp::new(next));
    }

    pub fn set(&self, secs: u64) {
        self.now.set(Timestamp::new(secs));
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_request() {
        let clock = NullClock::new(10);
        assert_eq!(clock.now(), Timestamp::new(10));
        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::new(15));
        clock.set(3);
        assert_eq!(clock.now(), Timestamp::new(3));
    }
}
