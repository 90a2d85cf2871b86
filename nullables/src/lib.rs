//! In-memory stand-ins for the poll ledger's collaborators.
//!
//! Clock, stake oracle, authority check, event sink and ledger store each
//! sit behind a trait; the types here implement those traits with state a
//! test can set and inspect directly. Nothing touches disk or network.

pub mod authority;
pub mod clock;
pub mod events;
pub mod oracle;
pub mod store;

pub use authority::NullAuthority;
pub use clock::NullClock;
pub use events::RecordingEventSink;
pub use oracle::NullStakeOracle;
pub use store::NullLedgerStore;
