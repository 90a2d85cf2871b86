//! Staged writes committed as a single unit.

use serde::{Deserialize, Serialize};
use stakepoll_types::{Address, Poll, PollId, TierId, VoteRecord};

/// One storage mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    PutPoll(Poll),
    SetPollCounter(PollId),
    PutVote {
        poll_id: PollId,
        tier_id: TierId,
        record: VoteRecord,
    },
    DeleteVote {
        poll_id: PollId,
        tier_id: TierId,
        voter: Address,
    },
    /// Setting tier `0` deletes the index entry.
    SetTier {
        poll_id: PollId,
        voter: Address,
        tier_id: TierId,
    },
}

/// An ordered list of mutations. Dropping it without applying it writes nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSet {
    ops: Vec<WriteOp>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

impl IntoIterator for WriteSet {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
