//! Nullable store: in-memory ledger storage for testing.

use stakepoll_store::{LedgerStore, PollStore, StoreError, VoteStore, WriteOp, WriteSet};
use stakepoll_types::{Address, Direction, Poll, PollId, TierId, VoteRecord, INACTIVE_TIER};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Clone, Default)]
struct LedgerState {
    counter: PollId,
    polls: BTreeMap<PollId, Poll>,
    votes: BTreeMap<(PollId, TierId, Address), VoteRecord>,
    tier_index: BTreeMap<(PollId, Address), TierId>,
}

/// An in-memory [`LedgerStore`] with the same ordering as the LMDB backend.
///
/// `fail_next_apply` makes the next `apply` return an error without writing
/// anything, to exercise callers' all-or-nothing handling.
#[derive(Default)]
pub struct NullLedgerStore {
    state: RefCell<LedgerState>,
    fail_next_apply: Cell<bool>,
    applied: Cell<usize>,
}

impl NullLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_apply(&self) {
        self.fail_next_apply.set(true);
    }

    /// Number of write sets successfully applied.
    pub fn applied_count(&self) -> usize {
        self.applied.get()
    }

    /// Every record of a poll across all tiers, as `(tier, record)`.
    pub fn all_votes(&self, poll_id: PollId) -> Vec<(TierId, VoteRecord)> {
        self.state
            .borrow()
            .votes
            .iter()
            .filter(|((p, _, _), _)| *p == poll_id)
            .map(|((_, t, _), r)| (*t, r.clone()))
            .collect()
    }

    /// Every tier-index entry of a poll.
    pub fn all_tier_entries(&self, poll_id: PollId) -> Vec<(Address, TierId)> {
        self.state
            .borrow()
            .tier_index
            .iter()
            .filter(|((p, _), _)| *p == poll_id)
            .map(|((_, a), t)| (a.clone(), *t))
            .collect()
    }
}

impl PollStore for NullLedgerStore {
    fn poll_counter(&self) -> Result<PollId, StoreError> {
        Ok(self.state.borrow().counter)
    }

    fn get_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        Ok(self.state.borrow().polls.get(&id).cloned())
    }

    fn range_polls(
        &self,
        start_after: Option<PollId>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<Poll>, StoreError> {
        let state = self.state.borrow();
        let polls = match (direction, start_after) {
            (Direction::Ascending, Some(id)) => state
                .polls
                .range((Bound::Excluded(id), Bound::Unbounded))
                .map(|(_, p)| p.clone())
                .take(limit)
                .collect(),
            (Direction::Ascending, None) => {
                state.polls.values().take(limit).cloned().collect()
            }
            (Direction::Descending, Some(id)) => state
                .polls
                .range(..id)
                .rev()
                .map(|(_, p)| p.clone())
                .take(limit)
                .collect(),
            (Direction::Descending, None) => {
                state.polls.values().rev().take(limit).cloned().collect()
            }
        };
        Ok(polls)
    }
}

impl VoteStore for NullLedgerStore {
    fn get_tier(&self, poll_id: PollId, voter: &Address) -> Result<TierId, StoreError> {
        Ok(self
            .state
            .borrow()
            .tier_index
            .get(&(poll_id, voter.clone()))
            .copied()
            .unwrap_or(INACTIVE_TIER))
    }

    fn get_vote(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self
            .state
            .borrow()
            .votes
            .get(&(poll_id, tier_id, voter.clone()))
            .cloned())
    }

    fn range_votes(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<VoteRecord>, StoreError> {
        let state = self.state.borrow();
        let lowest = (poll_id, tier_id, Address::new(Vec::new()));
        let mut bucket: Vec<VoteRecord> = state
            .votes
            .range((Bound::Included(lowest), Bound::Unbounded))
            .take_while(|((p, t, _), _)| *p == poll_id && *t == tier_id)
            .map(|(_, r)| r.clone())
            .collect();
        if direction == Direction::Descending {
            bucket.reverse();
        }
        let records = bucket
            .into_iter()
            .filter(|r| match (start_after, direction) {
                (None, _) => true,
                (Some(after), Direction::Ascending) => &r.voter > after,
                (Some(after), Direction::Descending) => &r.voter < after,
            })
            .take(limit)
            .collect();
        Ok(records)
    }
}

impl LedgerStore for NullLedgerStore {
    fn apply(&self, writes: WriteSet) -> Result<(), StoreError> {
        if self.fail_next_apply.replace(false) {
            return Err(StoreError::Backend("injected apply failure".into()));
        }
        let mut state = self.state.borrow_mut();
        for op in writes {
            match op {
                WriteOp::PutPoll(poll) => {
                    state.polls.insert(poll.id, poll);
                }
                WriteOp::SetPollCounter(next) => state.counter = next,
                WriteOp::PutVote {
                    poll_id,
                    tier_id,
                    record,
                } => {
                    state
                        .votes
                        .insert((poll_id, tier_id, record.voter.clone()), record);
                }
                WriteOp::DeleteVote {
                    poll_id,
                    tier_id,
                    voter,
                } => {
                    state.votes.remove(&(poll_id, tier_id, voter));
                }
                WriteOp::SetTier {
                    poll_id,
                    voter,
                    tier_id,
                } => {
                    if tier_id == INACTIVE_TIER {
                        state.tier_index.remove(&(poll_id, voter));
                    } else {
                        state.tier_index.insert((poll_id, voter), tier_id);
                    }
                }
            }
        }
        self.applied.set(self.applied.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepoll_types::Choice;

    fn record(voter: u8) -> VoteRecord {
        VoteRecord {
            voter: Address::new(vec![voter]),
            choice: Choice::Yes,
            stake: u64::from(voter),
        }
    }

    fn put(store: &NullLedgerStore, poll_id: PollId, tier_id: TierId, voter: u8) {
        let mut writes = WriteSet::new();
        writes.push(WriteOp::PutVote {
            poll_id,
            tier_id,
            record: record(voter),
        });
        store.apply(writes).unwrap();
    }

    #[test]
    fn range_votes_matches_lmdb_ordering() {
        let store = NullLedgerStore::new();
        for v in [4u8, 2, 8, 6] {
            put(&store, 1, 1, v);
        }
        put(&store, 1, 2, 1);
        put(&store, 2, 1, 3);

        let asc: Vec<u8> = store
            .range_votes(1, 1, Some(&Address::new(vec![2])), 2, Direction::Ascending)
            .unwrap()
            .iter()
            .map(|r| r.voter.as_bytes()[0])
            .collect();
        assert_eq!(asc, vec![4, 6]);

        let desc: Vec<u8> = store
            .range_votes(1, 1, None, 10, Direction::Descending)
            .unwrap()
            .iter()
            .map(|r| r.voter.as_bytes()[0])
            .collect();
        assert_eq!(desc, vec![8, 6, 4, 2]);
    }

    #[test]
    fn injected_failure_writes_nothing() {
        let store = NullLedgerStore::new();
        store.fail_next_apply();

        let mut writes = WriteSet::new();
        writes.push(WriteOp::SetPollCounter(3));
        assert!(store.apply(writes.clone()).is_err());
        assert_eq!(store.poll_counter().unwrap(), 0);
        assert_eq!(store.applied_count(), 0);

        store.apply(writes).unwrap();
        assert_eq!(store.poll_counter().unwrap(), 3);
    }

    #[test]
    fn tier_zero_removes_index_entry() {
        let store = NullLedgerStore::new();
        let voter = Address::new(vec![9]);
        let mut writes = WriteSet::new();
        writes.push(WriteOp::SetTier {
            poll_id: 0,
            voter: voter.clone(),
            tier_id: 2,
        });
        store.apply(writes).unwrap();
        assert_eq!(store.get_tier(0, &voter).unwrap(), 2);

        let mut writes = WriteSet::new();
        writes.push(WriteOp::SetTier {
            poll_id: 0,
            voter: voter.clone(),
            tier_id: 0,
        });
        store.apply(writes).unwrap();
        assert_eq!(store.get_tier(0, &voter).unwrap(), 0);
        assert!(store.all_tier_entries(0).is_empty());
    }
}
