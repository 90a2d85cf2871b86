//! Polls and their creation parameters.

use crate::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Sequential poll identifier, allocated by the registry.
pub type PollId = u32;

/// 1-based position in a poll's threshold list; `0` means no active vote.
pub type TierId = u32;

/// Tier id of a voter without a record.
pub const INACTIVE_TIER: TierId = 0;

const BPS_DENOMINATOR: u128 = 10_000;

/// Parameters supplied by the creator of a poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollParams {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub creator: Address,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Minimum stake per tier, scanned in the given order.
    pub tiers: Vec<u64>,
}

/// A stored poll with its running aggregates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub params: PollParams,
    /// Sum of the cached stake of every "yes" record.
    pub yes_weight: u128,
    /// Sum of the cached stake of every record.
    pub total_weight: u128,
    /// Stake supply snapshot, refreshed on creation and on every resync.
    pub total_supply: u64,
    pub created_at: Timestamp,
    pub last_update: Timestamp,
}

impl Poll {
    /// A freshly created poll with zeroed aggregates.
    pub fn new(id: PollId, params: PollParams, total_supply: u64, now: Timestamp) -> Self {
        Self {
            id,
            params,
            yes_weight: 0,
            total_weight: 0,
            total_supply,
            created_at: now,
            last_update: now,
        }
    }

    pub fn tier_count(&self) -> u32 {
        self.params.tiers.len() as u32
    }

    /// Whether `tier` addresses one of this poll's buckets.
    pub fn is_valid_tier(&self, tier: TierId) -> bool {
        tier >= 1 && tier <= self.tier_count()
    }

    /// Whether `now` is inside `[start_time, end_time]`.
    pub fn is_open(&self, now: Timestamp) -> bool {
        now.is_within(self.params.start_time, self.params.end_time)
    }

    pub fn no_weight(&self) -> u128 {
        self.total_weight.saturating_sub(self.yes_weight)
    }

    /// Share of participating weight voting yes, in basis points.
    pub fn approval_bps(&self) -> u32 {
        if self.total_weight == 0 {
            return 0;
        }
        (self.yes_weight * BPS_DENOMINATOR / self.total_weight) as u32
    }

    /// Participating weight relative to the supply snapshot, in basis points.
    ///
    /// Cached stakes can drift above the snapshot between resyncs, so the
    /// result is capped at 100%.
    pub fn participation_bps(&self) -> u32 {
        if self.total_supply == 0 {
            return 0;
        }
        let bps = self.total_weight * BPS_DENOMINATOR / u128::from(self.total_supply);
        bps.min(BPS_DENOMINATOR) as u32
    }
}
