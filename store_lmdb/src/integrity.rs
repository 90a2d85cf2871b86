//! Startup checks for a ledger environment.

use std::path::Path;

use heed::types::Bytes;

use crate::{LmdbEnvironment, LmdbError};

/// Databases every ledger environment must contain.
const EXPECTED_DATABASES: &[&str] = &["meta", "polls", "votes", "tier_index"];

/// Per-database entry counts plus anything that looked wrong.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub entries: Vec<(&'static str, u64)>,
    pub problems: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn total_entries(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

/// Open each expected database and count its entries.
///
/// A missing or unreadable database is reported, not returned as an error;
/// only failing to start the read transaction is.
pub fn check_integrity(environment: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let env = environment.env();
    let rtxn = env.read_txn()?;
    let mut report = IntegrityReport::default();

    for &name in EXPECTED_DATABASES {
        let db = match env.open_database::<Bytes, Bytes>(&rtxn, Some(name)) {
            Ok(Some(db)) => db,
            Ok(None) => {
                report.problems.push(format!("{name}: missing"));
                continue;
            }
            Err(e) => {
                report.problems.push(format!("{name}: {e}"));
                continue;
            }
        };
        match db.len(&rtxn) {
            Ok(count) => report.entries.push((name, count)),
            Err(e) => report.problems.push(format!("{name}: {e}")),
        }
    }

    if report.is_healthy() {
        tracing::debug!(entries = report.total_entries(), "ledger databases look sane");
    } else {
        tracing::warn!(problems = ?report.problems, "ledger integrity check failed");
    }
    Ok(report)
}

/// Reject a data directory that exists without an LMDB data file.
///
/// A directory that does not exist yet is fine: `open` creates it.
pub fn check_data_dir(path: &Path) -> Result<(), LmdbError> {
    if path.exists() && !path.join("data.mdb").exists() {
        return Err(LmdbError::NotFound(format!(
            "{} has no data.mdb",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_checks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(&dir.path().join("later")).is_ok());
        assert!(matches!(
            check_data_dir(dir.path()),
            Err(LmdbError::NotFound(_))
        ));
    }

    #[test]
    fn opened_environment_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 8, 1 << 20).unwrap();
        assert!(check_data_dir(dir.path()).is_ok());

        let report = check_integrity(&env).unwrap();
        assert!(report.is_healthy(), "{:?}", report.problems);
        assert_eq!(report.entries.len(), 4);
        // only the schema version so far
        assert_eq!(report.total_entries(), 1);
    }
}
