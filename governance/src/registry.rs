//! Poll registry: validation, sequential id allocation and lazy listing.

use std::collections::VecDeque;

use stakepoll_store::{LedgerStore, PollStore};
use stakepoll_types::{Direction, Poll, PollId, PollParams, Timestamp};

use crate::staging::StagedLedger;
use crate::PollError;

/// Polls fetched from storage per round trip while iterating.
const LIST_BATCH: usize = 64;

pub struct PollRegistry<'s, S> {
    store: &'s S,
}

impl<'s, S: LedgerStore> PollRegistry<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Check creation parameters against the current time.
    pub fn validate(params: &PollParams, now: Timestamp) -> Result<(), PollError> {
        if params.title.trim().is_empty() {
            return Err(PollError::Validation("title is empty".into()));
        }
        if params.creator.is_empty() {
            return Err(PollError::Validation("creator is empty".into()));
        }
        if params.tiers.is_empty() {
            return Err(PollError::Validation("no tier thresholds given".into()));
        }
        if params.start_time > params.end_time {
            return Err(PollError::Validation(format!(
                "start time {} is after end time {}",
                params.start_time, params.end_time
            )));
        }
        if params.end_time <= now {
            return Err(PollError::Validation(format!(
                "end time {} is not after the current time {now}",
                params.end_time
            )));
        }
        Ok(())
    }

    /// Stage a new poll under the next id of the persisted sequence.
    ///
    /// Nothing is written until the ledger is committed.
    pub fn create(
        ledger: &mut StagedLedger<'_, S>,
        params: PollParams,
        total_supply: u64,
        now: Timestamp,
    ) -> Result<Poll, PollError> {
        let id = ledger.poll_counter()?;
        let next = id
            .checked_add(1)
            .ok_or_else(|| PollError::Validation("poll id space exhausted".into()))?;
        let poll = Poll::new(id, params, total_supply, now);
        ledger.set_poll_counter(next);
        ledger.put_poll(poll.clone());
        Ok(poll)
    }

    pub fn get(&self, id: PollId) -> Result<Poll, PollError> {
        self.store
            .get_poll(id)?
            .ok_or_else(|| PollError::NotFound(format!("poll {id}")))
    }

    /// Up to `limit` polls walking ids in `direction`, strictly after
    /// `start_after`. Storage is read lazily as the iterator advances.
    pub fn list(
        &self,
        start_after: Option<PollId>,
        limit: usize,
        direction: Direction,
    ) -> PollIter<'s, S> {
        PollIter {
            store: self.store,
            cursor: start_after,
            remaining: limit,
            direction,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

/// Lazy, bounded walk over the poll table.
///
/// [`PollIter::cursor`] is the id of the last poll yielded; passing it as
/// `start_after` to [`PollRegistry::list`] resumes right after it.
pub struct PollIter<'s, S> {
    store: &'s S,
    cursor: Option<PollId>,
    remaining: usize,
    direction: Direction,
    buffer: VecDeque<Poll>,
    exhausted: bool,
}

impl<S> PollIter<'_, S> {
    pub fn cursor(&self) -> Option<PollId> {
        self.cursor
    }
}

impl<S: PollStore> Iterator for PollIter<'_, S> {
    type Item = Result<Poll, PollError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if self.buffer.is_empty() {
            if self.exhausted {
                return None;
            }
            let want = self.remaining.min(LIST_BATCH);
            match self.store.range_polls(self.cursor, want, self.direction) {
                Ok(page) => {
                    if page.len() < want {
                        self.exhausted = true;
                    }
                    self.buffer.extend(page);
                }
                Err(e) => {
                    self.remaining = 0;
                    return Some(Err(e.into()));
                }
            }
        }
        let poll = self.buffer.pop_front()?;
        self.cursor = Some(poll.id);
        self.remaining -= 1;
        Some(Ok(poll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepoll_nullables::NullLedgerStore;
    use stakepoll_types::Address;

    fn params(title: &str) -> PollParams {
        PollParams {
            title: title.into(),
            summary: "s".into(),
            url: "https://example.org".into(),
            creator: Address::new(vec![0xAA]),
            start_time: Timestamp::new(10),
            end_time: Timestamp::new(20),
            tiers: vec![100, 10],
        }
    }

    fn seed(store: &NullLedgerStore, count: usize) {
        for i in 0..count {
            let mut ledger = StagedLedger::new(store);
            PollRegistry::create(&mut ledger, params(&format!("p{i}")), 1_000, Timestamp::new(5))
                .unwrap();
            ledger.commit().unwrap();
        }
    }

    #[test]
    fn validation_rules() {
        let now = Timestamp::new(5);
        assert!(PollRegistry::<NullLedgerStore>::validate(&params("ok"), now).is_ok());

        let mut p = params(" ");
        assert!(PollRegistry::<NullLedgerStore>::validate(&p, now).is_err());

        p = params("x");
        p.tiers.clear();
        assert!(PollRegistry::<NullLedgerStore>::validate(&p, now).is_err());

        p = params("x");
        p.start_time = Timestamp::new(30);
        assert!(PollRegistry::<NullLedgerStore>::validate(&p, now).is_err());

        p = params("x");
        assert!(PollRegistry::<NullLedgerStore>::validate(&p, Timestamp::new(20)).is_err());

        p = params("x");
        p.creator = Address::new(Vec::new());
        assert!(PollRegistry::<NullLedgerStore>::validate(&p, now).is_err());

        // a zero-length window that has not yet ended is accepted
        p = params("x");
        p.start_time = Timestamp::new(20);
        assert!(PollRegistry::<NullLedgerStore>::validate(&p, now).is_ok());
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let store = NullLedgerStore::new();
        seed(&store, 3);
        let registry = PollRegistry::new(&store);
        assert_eq!(registry.get(0).unwrap().params.title, "p0");
        assert_eq!(registry.get(2).unwrap().params.title, "p2");
        assert!(matches!(registry.get(3), Err(PollError::NotFound(_))));
        assert_eq!(store.poll_counter().unwrap(), 3);
    }

    #[test]
    fn uncommitted_create_leaves_counter() {
        let store = NullLedgerStore::new();
        {
            let mut ledger = StagedLedger::new(&store);
            PollRegistry::create(&mut ledger, params("gone"), 1, Timestamp::EPOCH).unwrap();
        }
        assert_eq!(store.poll_counter().unwrap(), 0);
        assert!(store.get_poll(0).unwrap().is_none());
    }

    #[test]
    fn list_is_lazy_and_restartable() {
        let store = NullLedgerStore::new();
        seed(&store, 150);
        let registry = PollRegistry::new(&store);

        let mut iter = registry.list(None, 100, Direction::Ascending);
        let first: Vec<PollId> = iter.by_ref().take(70).map(|p| p.unwrap().id).collect();
        assert_eq!(first.first(), Some(&0));
        assert_eq!(first.last(), Some(&69));
        assert_eq!(iter.cursor(), Some(69));

        let rest: Vec<PollId> = registry
            .list(iter.cursor(), 1_000, Direction::Ascending)
            .map(|p| p.unwrap().id)
            .collect();
        assert_eq!(rest.len(), 80);
        assert_eq!(rest[0], 70);

        let desc: Vec<PollId> = registry
            .list(Some(3), 10, Direction::Descending)
            .map(|p| p.unwrap().id)
            .collect();
        assert_eq!(desc, vec![2, 1, 0]);
    }

    #[test]
    fn zero_limit_yields_nothing() {
        let store = NullLedgerStore::new();
        seed(&store, 2);
        assert_eq!(
            PollRegistry::new(&store)
                .list(None, 0, Direction::Ascending)
                .count(),
            0
        );
    }
}
