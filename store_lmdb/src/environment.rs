//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use stakepoll_store::StoreError;

use crate::meta::LmdbMetaStore;
use crate::migration::Migrator;
use crate::poll::LmdbLedgerStore;
use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) polls_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) tier_index_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // the memory map is never accessed outside heed's transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        let polls_db = env.create_database(&mut wtxn, Some("polls"))?;
        let votes_db = env.create_database(&mut wtxn, Some("votes"))?;
        let tier_index_db = env.create_database(&mut wtxn, Some("tier_index"))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            meta_db,
            polls_db,
            votes_db,
            tier_index_db,
        };
        Migrator::run(&environment.meta_store())?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(environment)
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Poll, bucket and tier-index store backed by this environment.
    pub fn ledger_store(&self) -> LmdbLedgerStore {
        LmdbLedgerStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
            polls_db: self.polls_db,
            votes_db: self.votes_db,
            tier_index_db: self.tier_index_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    /// Begin a write batch over all ledger databases.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(&self.env, self.meta_db, self.polls_db, self.votes_db, self.tier_index_db)
    }
}
