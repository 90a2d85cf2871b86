//! LMDB storage backend for the poll ledger.
//!
//! Implements the storage traits from `stakepoll-store` using the `heed` LMDB
//! bindings. Four databases live in a single environment:
//!
//! - `meta`: poll id counter and schema version.
//! - `polls`: `poll_id_be(4)` → bincode [`Poll`](stakepoll_types::Poll).
//! - `votes`: `poll_id_be(4) ++ tier_id_be(4) ++ voter` → bincode vote record.
//! - `tier_index`: `poll_id_be(4) ++ voter` → `tier_id_be(4)`.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod keys;
pub mod meta;
pub mod migration;
pub mod poll;
pub mod vote;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use poll::LmdbLedgerStore;
pub use write_batch::WriteBatch;
