//! Tier buckets and the tier index, as views over a [`StagedLedger`].
//!
//! A bucket is identified by `(poll, tier)` and holds at most one record per
//! voter. The tier index maps each voter of a poll to the single bucket that
//! holds their record; tier 0 means "no record anywhere".

use stakepoll_store::LedgerStore;
use stakepoll_types::{Address, Direction, PollId, TierId, VoteRecord};

use crate::staging::StagedLedger;
use crate::PollError;

pub struct TierBucket<'a, 's, S> {
    ledger: &'a mut StagedLedger<'s, S>,
    poll_id: PollId,
    tier_id: TierId,
}

impl<'a, 's, S: LedgerStore> TierBucket<'a, 's, S> {
    pub(crate) fn new(ledger: &'a mut StagedLedger<'s, S>, poll_id: PollId, tier_id: TierId) -> Self {
        Self {
            ledger,
            poll_id,
            tier_id,
        }
    }

    pub fn tier_id(&self) -> TierId {
        self.tier_id
    }

    pub fn get(&self, voter: &Address) -> Result<Option<VoteRecord>, PollError> {
        self.ledger.get_vote(self.poll_id, self.tier_id, voter)
    }

    /// Insert or overwrite the record keyed by `record.voter`.
    pub fn put(&mut self, record: VoteRecord) {
        self.ledger.put_vote(self.poll_id, self.tier_id, record);
    }

    pub fn remove(&mut self, voter: &Address) {
        self.ledger.delete_vote(self.poll_id, self.tier_id, voter);
    }

    /// Up to `limit` records in voter byte order, strictly after `start_after`.
    pub fn range(
        &self,
        start_after: Option<&Address>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<VoteRecord>, PollError> {
        self.ledger
            .range_votes(self.poll_id, self.tier_id, start_after, limit, direction)
    }
}

pub struct TierIndex<'a, 's, S> {
    ledger: &'a mut StagedLedger<'s, S>,
    poll_id: PollId,
}

impl<'a, 's, S: LedgerStore> TierIndex<'a, 's, S> {
    pub(crate) fn new(ledger: &'a mut StagedLedger<'s, S>, poll_id: PollId) -> Self {
        Self { ledger, poll_id }
    }

    /// The voter's tier, 0 when they have no record.
    pub fn get(&self, voter: &Address) -> Result<TierId, PollError> {
        self.ledger.get_tier(self.poll_id, voter)
    }

    /// Setting 0 deletes the mapping.
    pub fn set(&mut self, voter: &Address, tier_id: TierId) {
        self.ledger.set_tier(self.poll_id, voter, tier_id);
    }
}
