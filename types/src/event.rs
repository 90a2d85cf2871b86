//! Events emitted after a mutating operation commits.

use crate::{Address, Choice, PollId, TierId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollEvent {
    PollCreated {
        poll_id: PollId,
        creator: Address,
        title: String,
        start_time: Timestamp,
        end_time: Timestamp,
        tiers: Vec<u64>,
    },
    /// Carries the arguments of the vote call.
    Vote {
        poll_id: PollId,
        voter: Address,
        choice: Option<Choice>,
    },
    /// Summary of one resync batch. No per-voter events are emitted.
    VotesUpdated {
        poll_id: PollId,
        tier_id: TierId,
        processed: u32,
        moved: u32,
        deactivated: u32,
        yes_weight: u128,
        total_weight: u128,
        next_cursor: Option<Address>,
    },
}

impl PollEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PollCreated { .. } => "poll_created",
            Self::Vote { .. } => "vote",
            Self::VotesUpdated { .. } => "votes_updated",
        }
    }
}

/// Fire-and-forget event delivery.
pub trait EventSink {
    fn emit(&self, event: &PollEvent, involved: &[Address]);
}
