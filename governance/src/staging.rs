//! Working copies for one operation.
//!
//! A [`StagedLedger`] reads through to the committed store and keeps every
//! write in an in-memory overlay. Nothing reaches storage until
//! [`StagedLedger::commit`]; dropping the ledger discards the overlay, which
//! is how a failed operation leaves no trace.

use std::collections::BTreeMap;
use std::ops::Bound;

use stakepoll_store::{LedgerStore, WriteOp, WriteSet};
use stakepoll_types::{Address, Direction, Poll, PollId, TierId, VoteRecord, INACTIVE_TIER};

use crate::bucket::{TierBucket, TierIndex};
use crate::PollError;

type VoteKey = (PollId, TierId, Address);

pub struct StagedLedger<'s, S> {
    store: &'s S,
    counter: Option<PollId>,
    polls: BTreeMap<PollId, Poll>,
    /// `None` marks a deleted record.
    votes: BTreeMap<VoteKey, Option<VoteRecord>>,
    tiers: BTreeMap<(PollId, Address), TierId>,
}

impl<'s, S: LedgerStore> StagedLedger<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            counter: None,
            polls: BTreeMap::new(),
            votes: BTreeMap::new(),
            tiers: BTreeMap::new(),
        }
    }

    /// The bucket holding records of `poll_id` in `tier_id`.
    pub fn bucket(&mut self, poll_id: PollId, tier_id: TierId) -> TierBucket<'_, 's, S> {
        TierBucket::new(self, poll_id, tier_id)
    }

    /// The voter → tier map of `poll_id`.
    pub fn index(&mut self, poll_id: PollId) -> TierIndex<'_, 's, S> {
        TierIndex::new(self, poll_id)
    }

    // ── Poll table ──────────────────────────────────────────────────────

    pub fn poll_counter(&self) -> Result<PollId, PollError> {
        match self.counter {
            Some(next) => Ok(next),
            None => Ok(self.store.poll_counter()?),
        }
    }

    pub fn set_poll_counter(&mut self, next: PollId) {
        self.counter = Some(next);
    }

    pub fn poll(&self, id: PollId) -> Result<Option<Poll>, PollError> {
        match self.polls.get(&id) {
            Some(poll) => Ok(Some(poll.clone())),
            None => Ok(self.store.get_poll(id)?),
        }
    }

    pub fn put_poll(&mut self, poll: Poll) {
        self.polls.insert(poll.id, poll);
    }

    // ── Buckets ─────────────────────────────────────────────────────────

    pub(crate) fn get_vote(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, PollError> {
        match self.votes.get(&(poll_id, tier_id, voter.clone())) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.store.get_vote(poll_id, tier_id, voter)?),
        }
    }

    pub(crate) fn put_vote(&mut self, poll_id: PollId, tier_id: TierId, record: VoteRecord) {
        self.votes
            .insert((poll_id, tier_id, record.voter.clone()), Some(record));
    }

    pub(crate) fn delete_vote(&mut self, poll_id: PollId, tier_id: TierId, voter: &Address) {
        self.votes.insert((poll_id, tier_id, voter.clone()), None);
    }

    /// Committed records merged with staged ones, in bucket order.
    pub(crate) fn range_votes(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<VoteRecord>, PollError> {
        let lowest = (poll_id, tier_id, Address::new(Vec::new()));
        let staged: Vec<(&Address, &Option<VoteRecord>)> = self
            .votes
            .range((Bound::Included(lowest), Bound::Unbounded))
            .take_while(|((p, t, _), _)| *p == poll_id && *t == tier_id)
            .map(|((_, _, voter), staged)| (voter, staged))
            .collect();

        // Each staged entry can hide at most one committed record.
        let committed = self.store.range_votes(
            poll_id,
            tier_id,
            start_after,
            limit.saturating_add(staged.len()),
            direction,
        )?;

        let mut merged: BTreeMap<Address, VoteRecord> = committed
            .into_iter()
            .map(|record| (record.voter.clone(), record))
            .collect();
        for (voter, entry) in staged {
            let in_range = match (start_after, direction) {
                (None, _) => true,
                (Some(after), Direction::Ascending) => voter > after,
                (Some(after), Direction::Descending) => voter < after,
            };
            match entry {
                Some(record) if in_range => {
                    merged.insert(voter.clone(), record.clone());
                }
                _ => {
                    merged.remove(voter);
                }
            }
        }

        let records: Vec<VoteRecord> = match direction {
            Direction::Ascending => merged.into_values().take(limit).collect(),
            Direction::Descending => merged.into_values().rev().take(limit).collect(),
        };
        Ok(records)
    }

    // ── Tier index ──────────────────────────────────────────────────────

    pub(crate) fn get_tier(&self, poll_id: PollId, voter: &Address) -> Result<TierId, PollError> {
        match self.tiers.get(&(poll_id, voter.clone())) {
            Some(tier) => Ok(*tier),
            None => Ok(self.store.get_tier(poll_id, voter)?),
        }
    }

    pub(crate) fn set_tier(&mut self, poll_id: PollId, voter: &Address, tier_id: TierId) {
        self.tiers.insert((poll_id, voter.clone()), tier_id);
    }

    // ── Commit ──────────────────────────────────────────────────────────

    /// Whether anything has been staged.
    pub fn is_dirty(&self) -> bool {
        self.counter.is_some()
            || !self.polls.is_empty()
            || !self.votes.is_empty()
            || !self.tiers.is_empty()
    }

    /// Turn the overlay into the write set that reproduces it.
    ///
    /// Deletes come before puts so a record moved between buckets is never
    /// observable twice, even by a backend that applied operations one by one.
    pub fn into_write_set(self) -> WriteSet {
        let mut writes = WriteSet::new();
        if let Some(next) = self.counter {
            writes.push(WriteOp::SetPollCounter(next));
        }
        let mut puts = Vec::new();
        for ((poll_id, tier_id, voter), staged) in self.votes {
            match staged {
                Some(record) => puts.push(WriteOp::PutVote {
                    poll_id,
                    tier_id,
                    record,
                }),
                None => writes.push(WriteOp::DeleteVote {
                    poll_id,
                    tier_id,
                    voter,
                }),
            }
        }
        for op in puts {
            writes.push(op);
        }
        for ((poll_id, voter), tier_id) in self.tiers {
            writes.push(WriteOp::SetTier {
                poll_id,
                voter,
                tier_id,
            });
        }
        for poll in self.polls.into_values() {
            writes.push(WriteOp::PutPoll(poll));
        }
        writes
    }

    /// Apply everything staged as one atomic write.
    pub fn commit(self) -> Result<(), PollError> {
        let store = self.store;
        let writes = self.into_write_set();
        store.apply(writes)?;
        Ok(())
    }
}

/// Whether a tier id marks an active record.
pub(crate) fn is_active(tier_id: TierId) -> bool {
    tier_id != INACTIVE_TIER
}
