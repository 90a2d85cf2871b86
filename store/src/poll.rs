//! Poll table storage trait.

use crate::StoreError;
use stakepoll_types::{Direction, Poll, PollId};

/// Read access to the poll table and the poll id sequence.
pub trait PollStore {
    /// The id the next created poll will receive (0 on a fresh store).
    fn poll_counter(&self) -> Result<PollId, StoreError>;

    /// Get a poll by id.
    fn get_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError>;

    /// Up to `limit` polls in id order, strictly after `start_after`
    /// (or from the first/last poll when `None`).
    fn range_polls(
        &self,
        start_after: Option<PollId>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<Poll>, StoreError>;
}
