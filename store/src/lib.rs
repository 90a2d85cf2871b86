//! Abstract storage traits for the poll ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Reads go through [`PollStore`] and [`VoteStore`]. Writes are never issued
//! one by one: callers stage them in a [`WriteSet`] and hand the whole set to
//! [`LedgerStore::apply`], which commits it atomically or not at all.

pub mod error;
pub mod meta;
pub mod poll;
pub mod vote;
pub mod write_set;

pub use error::StoreError;
pub use meta::MetaStore;
pub use poll::PollStore;
pub use vote::VoteStore;
pub use write_set::{WriteOp, WriteSet};

/// A complete ledger backend: all reads plus atomic application of a write set.
pub trait LedgerStore: PollStore + VoteStore {
    /// Apply every operation in `writes`, in order, as one atomic unit.
    fn apply(&self, writes: WriteSet) -> Result<(), StoreError>;
}
