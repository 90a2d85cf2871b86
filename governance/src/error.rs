use stakepoll_store::StoreError;
use stakepoll_types::{PollId, TierId, Timestamp};
use thiserror::Error;

/// Every failure aborts the whole operation with nothing written.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("invalid poll parameters: {0}")]
    Validation(String),

    #[error("account {0} authorization failed")]
    Authorization(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("poll {poll_id} is not open at {now} (window {start}..={end})")]
    TimeWindow {
        poll_id: PollId,
        now: Timestamp,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("voter {0} already has this choice recorded")]
    RedundantVote(String),

    #[error("stake of {voter} is below the lowest tier threshold {minimum}")]
    InsufficientStake { voter: String, minimum: u64 },

    #[error("tier {tier_id} is out of range 1..={tier_count}")]
    InvalidTier { tier_id: TierId, tier_count: u32 },

    #[error("ledger invariant violated: {0}")]
    Corrupted(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
