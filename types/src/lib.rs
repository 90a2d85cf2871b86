//! Fundamental types for stake-weighted polls.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, timestamps, the poll and vote data model, event payloads, and the
//! traits through which the ledger talks to its external collaborators
//! (stake oracle, authorization check, clock, event sink).

pub mod address;
pub mod event;
pub mod external;
pub mod poll;
pub mod time;
pub mod vote;

pub use address::{Address, AddressError};
pub use event::{EventSink, PollEvent};
pub use external::{AuthorityCheck, CallContext, Clock, StakeOracle, SystemClock};
pub use poll::{Poll, PollId, PollParams, TierId, INACTIVE_TIER};
pub use time::Timestamp;
pub use vote::{Choice, Direction, VoteRecord};
