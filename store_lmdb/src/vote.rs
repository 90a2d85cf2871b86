//! LMDB implementation of VoteStore.

use std::ops::Bound;

use stakepoll_store::vote::VoteStore;
use stakepoll_store::StoreError;
use stakepoll_types::{Address, Direction, PollId, TierId, VoteRecord, INACTIVE_TIER};

use crate::keys::{bucket_prefix, collect_range, prefix_end, tier_index_key, vote_key};
use crate::meta::decode_u32;
use crate::poll::LmdbLedgerStore;
use crate::LmdbError;

impl VoteStore for LmdbLedgerStore {
    fn get_tier(&self, poll_id: PollId, voter: &Address) -> Result<TierId, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let key = tier_index_key(poll_id, voter);
        match self
            .tier_index_db
            .get(&rtxn, &key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode_u32(bytes, "tier id")?),
            None => Ok(INACTIVE_TIER),
        }
    }

    fn get_vote(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let key = vote_key(poll_id, tier_id, voter);
        match self.votes_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => {
                let record: VoteRecord = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn range_votes(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = bucket_prefix(poll_id, tier_id);
        let cursor = start_after.map(|voter| Bound::Excluded(vote_key(poll_id, tier_id, voter)));

        let (lower, upper) = match direction {
            Direction::Ascending => (
                cursor.unwrap_or_else(|| Bound::Included(prefix.to_vec())),
                prefix_end(&prefix),
            ),
            Direction::Descending => (
                Bound::Included(prefix.to_vec()),
                cursor.unwrap_or_else(|| prefix_end(&prefix)),
            ),
        };
        let records = collect_range(&self.votes_db, &rtxn, lower, upper, limit, direction)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepoll_store::{LedgerStore, WriteOp, WriteSet};
    use stakepoll_types::Choice;

    fn open_test_env() -> (tempfile::TempDir, crate::LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = crate::LmdbEnvironment::open(dir.path(), 8, 1 << 20).unwrap();
        (dir, env)
    }

    fn record(voter: u8, stake: u64) -> VoteRecord {
        VoteRecord {
            voter: Address::new(vec![voter]),
            choice: Choice::Yes,
            stake,
        }
    }

    fn put(store: &LmdbLedgerStore, poll_id: PollId, tier_id: TierId, rec: VoteRecord) {
        let mut writes = WriteSet::new();
        writes.push(WriteOp::SetTier {
            poll_id,
            voter: rec.voter.clone(),
            tier_id,
        });
        writes.push(WriteOp::PutVote {
            poll_id,
            tier_id,
            record: rec,
        });
        store.apply(writes).unwrap();
    }

    fn voters(records: &[VoteRecord]) -> Vec<u8> {
        records.iter().map(|r| r.voter.as_bytes()[0]).collect()
    }

    #[test]
    fn missing_voter_is_inactive() {
        let (_dir, env) = open_test_env();
        let store = env.ledger_store();
        let voter = Address::new(vec![1]);
        assert_eq!(store.get_tier(0, &voter).unwrap(), INACTIVE_TIER);
        assert!(store.get_vote(0, 1, &voter).unwrap().is_none());
    }

    #[test]
    fn set_tier_zero_deletes_entry() {
        let (_dir, env) = open_test_env();
        let store = env.ledger_store();
        put(&store, 0, 2, record(5, 50));
        assert_eq!(store.get_tier(0, &Address::new(vec![5])).unwrap(), 2);

        let mut writes = WriteSet::new();
        writes.push(WriteOp::DeleteVote {
            poll_id: 0,
            tier_id: 2,
            voter: Address::new(vec![5]),
        });
        writes.push(WriteOp::SetTier {
            poll_id: 0,
            voter: Address::new(vec![5]),
            tier_id: 0,
        });
        store.apply(writes).unwrap();

        assert_eq!(store.get_tier(0, &Address::new(vec![5])).unwrap(), 0);
        assert!(store.get_vote(0, 2, &Address::new(vec![5])).unwrap().is_none());
        let rtxn = env.env().read_txn().unwrap();
        assert_eq!(env.tier_index_db.len(&rtxn).unwrap(), 0);
    }

    #[test]
    fn buckets_do_not_leak_into_each_other() {
        let (_dir, env) = open_test_env();
        let store = env.ledger_store();
        put(&store, 1, 1, record(1, 10));
        put(&store, 1, 2, record(2, 20));
        put(&store, 2, 1, record(3, 30));
        put(&store, 0, 1, record(4, 40));

        let bucket = store.range_votes(1, 1, None, 100, Direction::Ascending).unwrap();
        assert_eq!(voters(&bucket), vec![1]);
        let bucket = store.range_votes(1, 2, None, 100, Direction::Descending).unwrap();
        assert_eq!(voters(&bucket), vec![2]);
        assert!(store
            .range_votes(1, 3, None, 100, Direction::Ascending)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn range_votes_is_restartable() {
        let (_dir, env) = open_test_env();
        let store = env.ledger_store();
        for v in [9u8, 3, 7, 1, 5] {
            put(&store, 0, 1, record(v, u64::from(v)));
        }

        let page = store.range_votes(0, 1, None, 2, Direction::Ascending).unwrap();
        assert_eq!(voters(&page), vec![1, 3]);
        let page = store
            .range_votes(0, 1, Some(&Address::new(vec![3])), 2, Direction::Ascending)
            .unwrap();
        assert_eq!(voters(&page), vec![5, 7]);

        let page = store.range_votes(0, 1, None, 2, Direction::Descending).unwrap();
        assert_eq!(voters(&page), vec![9, 7]);
        let page = store
            .range_votes(0, 1, Some(&Address::new(vec![7])), 10, Direction::Descending)
            .unwrap();
        assert_eq!(voters(&page), vec![5, 3, 1]);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let (_dir, env) = open_test_env();
        let store = env.ledger_store();
        put(&store, 0, 1, record(1, 1));
        assert!(store
            .range_votes(0, 1, None, 0, Direction::Ascending)
            .unwrap()
            .is_empty());
    }
}
