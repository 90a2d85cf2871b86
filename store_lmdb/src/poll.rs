//! LMDB implementation of PollStore.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakepoll_store::poll::PollStore;
use stakepoll_store::StoreError;
use stakepoll_types::{Direction, Poll, PollId};

use crate::keys::{collect_range, poll_key};
use crate::meta::{decode_u32, POLL_COUNTER_KEY};
use crate::LmdbError;

/// Ledger store over the `meta`, `polls`, `votes` and `tier_index` databases.
///
/// Cheap to clone; every clone shares the same environment.
#[derive(Clone)]
pub struct LmdbLedgerStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) polls_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) tier_index_db: Database<Bytes, Bytes>,
}

impl PollStore for LmdbLedgerStore {
    fn poll_counter(&self) -> Result<PollId, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .meta_db
            .get(&rtxn, POLL_COUNTER_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode_u32(bytes, "poll_counter")?),
            None => Ok(0),
        }
    }

    fn get_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let key = poll_key(id);
        match self.polls_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => {
                let poll: Poll = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(poll))
            }
            None => Ok(None),
        }
    }

    fn range_polls(
        &self,
        start_after: Option<PollId>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<Poll>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let cursor = match start_after {
            Some(id) => Bound::Excluded(poll_key(id).to_vec()),
            None => Bound::Unbounded,
        };
        let (lower, upper) = match direction {
            Direction::Ascending => (cursor, Bound::Unbounded),
            Direction::Descending => (Bound::Unbounded, cursor),
        };
        let polls = collect_range(&self.polls_db, &rtxn, lower, upper, limit, direction)?;
        Ok(polls)
    }
}
