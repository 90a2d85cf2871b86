//! Stake-weighted yes/no polls.
//!
//! Voters are partitioned into tier buckets by stake magnitude so that
//! recomputing cached weights after stake drift (`update_votes`) touches one
//! bounded bucket at a time. Poll aggregates are maintained by delta updates
//! and every call is all-or-nothing: work happens on a staged overlay that is
//! committed in one atomic write.
//!
//! Key principle: one stake unit = one unit of weight, cached at the time of
//! the voter's last vote or resync.

pub mod bucket;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod service;
pub mod sink;
pub mod staging;

pub use bucket::{TierBucket, TierIndex};
pub use config::{LoggingConfig, PollConfig, StorageConfig};
pub use engine::VoteEngine;
pub use error::PollError;
pub use registry::{PollIter, PollRegistry};
pub use service::{Collaborators, PollService, ResyncReport};
pub use sink::TracingEventSink;
pub use staging::StagedLedger;
