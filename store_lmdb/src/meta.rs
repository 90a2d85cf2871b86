//! The `meta` database: schema version, poll id counter and free-form keys.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakepoll_store::meta::MetaStore;
use stakepoll_store::StoreError;

use crate::LmdbError;

pub(crate) const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
pub(crate) const POLL_COUNTER_KEY: &[u8] = b"poll_counter";

pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// Decode a 4-byte big-endian value stored under `what`.
pub(crate) fn decode_u32(bytes: &[u8], what: &str) -> Result<u32, LmdbError> {
    <[u8; 4]>::try_from(bytes)
        .map(u32::from_be_bytes)
        .map_err(|_| LmdbError::Serialization(format!("{what}: expected 4 bytes, got {}", bytes.len())))
}

impl LmdbMetaStore {
    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let value = self.meta_db.get(&rtxn, key)?.map(<[u8]>::to_vec);
        Ok(value)
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        self.meta_db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }
}

impl MetaStore for LmdbMetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        Ok(self.write(key.as_bytes(), value)?)
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read(key.as_bytes())?)
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        match self.read(SCHEMA_VERSION_KEY)? {
            Some(bytes) => Ok(decode_u32(&bytes, "schema_version")?),
            None => Ok(0),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        Ok(self.write(SCHEMA_VERSION_KEY, &version.to_be_bytes())?)
    }
}
