//! Tier bucket and tier index storage trait.

use crate::StoreError;
use stakepoll_types::{Address, Direction, PollId, TierId, VoteRecord};

/// Read access to the per-(poll, tier) buckets and the per-poll tier index.
///
/// Implementations must keep distinct `(poll, tier)` pairs in disjoint key
/// ranges and order each bucket by voter byte order.
pub trait VoteStore {
    /// The voter's current tier, `0` when no entry exists.
    fn get_tier(&self, poll_id: PollId, voter: &Address) -> Result<TierId, StoreError>;

    /// The voter's record inside bucket `(poll_id, tier_id)`.
    fn get_vote(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, StoreError>;

    /// Up to `limit` records of bucket `(poll_id, tier_id)`, strictly after
    /// `start_after` in the given direction.
    fn range_votes(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<VoteRecord>, StoreError>;
}
