//! Write batching: groups ledger mutations into a single LMDB write
//! transaction so that one operation's writes land together or not at all.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put_poll(&poll)?;
//! batch.put_vote(poll.id, tier, &record)?;
//! batch.set_tier(poll.id, &record.voter, tier)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use stakepoll_store::{LedgerStore, StoreError, WriteOp, WriteSet};
use stakepoll_types::{Address, Poll, PollId, TierId, VoteRecord, INACTIVE_TIER};

use crate::keys::{poll_key, tier_index_key, vote_key};
use crate::meta::POLL_COUNTER_KEY;
use crate::poll::LmdbLedgerStore;
use crate::LmdbError;

/// A write batch over the ledger databases, backed by one LMDB write transaction.
pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    meta_db: Database<Bytes, Bytes>,
    polls_db: Database<Bytes, Bytes>,
    votes_db: Database<Bytes, Bytes>,
    tier_index_db: Database<Bytes, Bytes>,
    ops: usize,
}

impl<'a> WriteBatch<'a> {
    /// Begin a new write batch.
    pub(crate) fn new(
        env: &'a Env,
        meta_db: Database<Bytes, Bytes>,
        polls_db: Database<Bytes, Bytes>,
        votes_db: Database<Bytes, Bytes>,
        tier_index_db: Database<Bytes, Bytes>,
    ) -> Result<Self, StoreError> {
        let txn = env.write_txn().map_err(LmdbError::from)?;
        Ok(Self {
            txn,
            meta_db,
            polls_db,
            votes_db,
            tier_index_db,
            ops: 0,
        })
    }

    // ── Poll table ──────────────────────────────────────────────────────

    pub fn put_poll(&mut self, poll: &Poll) -> Result<(), StoreError> {
        let bytes = bincode::serialize(poll).map_err(LmdbError::from)?;
        self.polls_db
            .put(&mut self.txn, &poll_key(poll.id), &bytes)
            .map_err(LmdbError::from)?;
        self.ops += 1;
        Ok(())
    }

    pub fn set_poll_counter(&mut self, next_id: PollId) -> Result<(), StoreError> {
        self.meta_db
            .put(&mut self.txn, POLL_COUNTER_KEY, &next_id.to_be_bytes())
            .map_err(LmdbError::from)?;
        self.ops += 1;
        Ok(())
    }

    // ── Tier buckets ────────────────────────────────────────────────────

    pub fn put_vote(
        &mut self,
        poll_id: PollId,
        tier_id: TierId,
        record: &VoteRecord,
    ) -> Result<(), StoreError> {
        let key = vote_key(poll_id, tier_id, &record.voter);
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.votes_db
            .put(&mut self.txn, &key, &bytes)
            .map_err(LmdbError::from)?;
        self.ops += 1;
        Ok(())
    }

    pub fn delete_vote(
        &mut self,
        poll_id: PollId,
        tier_id: TierId,
        voter: &Address,
    ) -> Result<(), StoreError> {
        let key = vote_key(poll_id, tier_id, voter);
        self.votes_db
            .delete(&mut self.txn, &key)
            .map_err(LmdbError::from)?;
        self.ops += 1;
        Ok(())
    }

    // ── Tier index ──────────────────────────────────────────────────────

    /// Point `voter` at `tier_id`; tier 0 removes the entry.
    pub fn set_tier(
        &mut self,
        poll_id: PollId,
        voter: &Address,
        tier_id: TierId,
    ) -> Result<(), StoreError> {
        let key = tier_index_key(poll_id, voter);
        if tier_id == INACTIVE_TIER {
            self.tier_index_db
                .delete(&mut self.txn, &key)
                .map_err(LmdbError::from)?;
        } else {
            self.tier_index_db
                .put(&mut self.txn, &key, &tier_id.to_be_bytes())
                .map_err(LmdbError::from)?;
        }
        self.ops += 1;
        Ok(())
    }

    /// Route one staged operation to the matching method.
    pub fn apply_op(&mut self, op: &WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::PutPoll(poll) => self.put_poll(poll),
            WriteOp::SetPollCounter(next_id) => self.set_poll_counter(*next_id),
            WriteOp::PutVote {
                poll_id,
                tier_id,
                record,
            } => self.put_vote(*poll_id, *tier_id, record),
            WriteOp::DeleteVote {
                poll_id,
                tier_id,
                voter,
            } => self.delete_vote(*poll_id, *tier_id, voter),
            WriteOp::SetTier {
                poll_id,
                voter,
                tier_id,
            } => self.set_tier(*poll_id, voter, *tier_id),
        }
    }

    /// Number of operations written so far.
    pub fn len(&self) -> usize {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }

    /// Commit all operations atomically.
    pub fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

impl LedgerStore for LmdbLedgerStore {
    fn apply(&self, writes: WriteSet) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::new(
            &self.env,
            self.meta_db,
            self.polls_db,
            self.votes_db,
            self.tier_index_db,
        )?;
        for op in writes.ops() {
            batch.apply_op(op)?;
        }
        let count = batch.len();
        batch.commit()?;
        tracing::trace!(ops = count, "committed write set");
        Ok(())
    }
}
