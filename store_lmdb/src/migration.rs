//! Schema versioning for a ledger environment.
//!
//! The version is kept under `schema_version` in `meta` and walked forward
//! one step at a time when an environment is opened. A version newer than
//! this build knows is refused.

use std::cmp::Ordering;

use stakepoll_store::{MetaStore, StoreError};

use crate::LmdbError;

/// Layout version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub struct Migrator;

impl Migrator {
    /// Bring the stored schema up to [`CURRENT_SCHEMA_VERSION`] and return it.
    ///
    /// A fresh environment reports version 0.
    pub fn run<M: MetaStore>(meta: &M) -> Result<u32, LmdbError> {
        let stored = meta.get_schema_version().map_err(meta_error)?;
        match stored.cmp(&CURRENT_SCHEMA_VERSION) {
            Ordering::Equal => {
                tracing::debug!(version = stored, "schema current");
                return Ok(stored);
            }
            Ordering::Greater => {
                tracing::warn!(
                    found = stored,
                    supported = CURRENT_SCHEMA_VERSION,
                    "environment was written by a newer build"
                );
                return Err(LmdbError::UnsupportedSchema {
                    found: stored,
                    supported: CURRENT_SCHEMA_VERSION,
                });
            }
            Ordering::Less => {}
        }

        for from in stored..CURRENT_SCHEMA_VERSION {
            upgrade(from)?;
            meta.set_schema_version(from + 1).map_err(meta_error)?;
            tracing::info!(from, to = from + 1, "schema upgraded");
        }
        Ok(CURRENT_SCHEMA_VERSION)
    }
}

fn upgrade(from: u32) -> Result<(), LmdbError> {
    match from {
        // 0 -> 1: the four databases are created by `LmdbEnvironment::open`,
        // only the version needs recording.
        0 => Ok(()),
        other => Err(LmdbError::Heed(format!("no upgrade path from schema {other}"))),
    }
}

fn meta_error(e: StoreError) -> LmdbError {
    LmdbError::Heed(e.to_string())
}
