//! Key derivation for the LMDB databases.
//!
//! All numeric components are fixed-width big-endian, so lexicographic key
//! order equals numeric order and a `(poll, tier)` prefix can never be a
//! prefix of another `(poll, tier)` pair's keys.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn};
use serde::de::DeserializeOwned;

use stakepoll_types::{Address, Direction, PollId, TierId};

use crate::LmdbError;

/// Key of a poll in `polls`.
pub fn poll_key(poll_id: PollId) -> [u8; 4] {
    poll_id.to_be_bytes()
}

/// Shared prefix of every record in bucket `(poll_id, tier_id)`.
pub fn bucket_prefix(poll_id: PollId, tier_id: TierId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&poll_id.to_be_bytes());
    key[4..].copy_from_slice(&tier_id.to_be_bytes());
    key
}

/// Key of a voter's record in `votes`.
pub fn vote_key(poll_id: PollId, tier_id: TierId, voter: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + voter.len());
    key.extend_from_slice(&bucket_prefix(poll_id, tier_id));
    key.extend_from_slice(voter.as_bytes());
    key
}

/// Key of a voter's entry in `tier_index`.
pub fn tier_index_key(poll_id: PollId, voter: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(4 + voter.len());
    key.extend_from_slice(&poll_id.to_be_bytes());
    key.extend_from_slice(voter.as_bytes());
    key
}

/// Increment a byte prefix to produce the exclusive upper bound for a prefix
/// scan. Returns `false` if every byte was `0xFF` (no finite upper bound).
pub fn increment_prefix(prefix: &mut Vec<u8>) -> bool {
    while let Some(last) = prefix.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return true;
        }
        prefix.pop();
    }
    false
}

/// Exclusive upper bound of everything starting with `prefix`.
pub(crate) fn prefix_end(prefix: &[u8]) -> Bound<Vec<u8>> {
    let mut upper = prefix.to_vec();
    if increment_prefix(&mut upper) {
        Bound::Excluded(upper)
    } else {
        Bound::Unbounded
    }
}

fn borrow(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Decode up to `limit` values between `lower` and `upper`, walking in
/// `direction` (descending starts from `upper`).
pub(crate) fn collect_range<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    limit: usize,
    direction: Direction,
) -> Result<Vec<T>, LmdbError> {
    let mut results = Vec::new();
    if limit == 0 {
        return Ok(results);
    }
    let bounds = (borrow(&lower), borrow(&upper));
    match direction {
        Direction::Ascending => {
            for entry in db.range(rtxn, &bounds)? {
                let (_key, val) = entry?;
                results.push(bincode::deserialize(val)?);
                if results.len() >= limit {
                    break;
                }
            }
        }
        Direction::Descending => {
            for entry in db.rev_range(rtxn, &bounds)? {
                let (_key, val) = entry?;
                results.push(bincode::deserialize(val)?);
                if results.len() >= limit {
                    break;
                }
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_carries() {
        let mut p = vec![0x00, 0xFF];
        assert!(increment_prefix(&mut p));
        assert_eq!(p, vec![0x01]);

        let mut all_ff = vec![0xFF, 0xFF];
        assert!(!increment_prefix(&mut all_ff));
    }

    #[test]
    fn bucket_prefixes_are_disjoint() {
        // poll 1 / tier 2 must not prefix poll 1 / tier 20 or poll 12 / tier 0.
        let a = bucket_prefix(1, 2);
        assert!(!vote_key(1, 20, &Address::new(vec![0])).starts_with(&a));
        assert!(!vote_key(12, 0, &Address::new(vec![0])).starts_with(&a));
        assert!(vote_key(1, 2, &Address::new(vec![0xAA])).starts_with(&a));
    }

    #[test]
    fn vote_keys_sort_by_voter_within_bucket() {
        let low = vote_key(3, 1, &Address::new(vec![0x01, 0xFF]));
        let high = vote_key(3, 1, &Address::new(vec![0x02]));
        assert!(low < high);
        assert!(high < bucket_prefix(3, 2).to_vec());
    }
}
