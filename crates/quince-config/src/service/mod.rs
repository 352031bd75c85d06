//! Service layer
//!
//! - `config`: transactional write sequences and read paths
//! - `history`: history log queries and purge
//! - `import`: policy-driven batch import
//! - `namespace`: namespace metadata CRUD
//! - `capacity`: quota lookup and usage accounting

pub mod capacity;
pub mod config;
pub mod history;
pub mod import;
pub mod namespace;

use sea_orm::DbErr;

use quince_common::QuinceError;
use quince_persistence::model::ConfigKey;
use quince_persistence::sql::{is_connection_error, is_unique_violation};

/// Log a storage failure with full detail and hand it back unchanged
pub(crate) fn log_db_error(operation: &str, err: DbErr) -> DbErr {
    if is_connection_error(&err) {
        tracing::error!("[db-error] {} failed, storage unavailable: {:?}", operation, err);
    } else {
        tracing::error!("[db-error] {} failed: {}", operation, err);
    }
    err
}

/// Map a unique-key violation on `key` to `ConfigConflict`, anything else is
/// logged and propagated as is
pub(crate) fn conflict_or_db_error(operation: &str, key: &ConfigKey, err: DbErr) -> anyhow::Error {
    if is_unique_violation(&err) {
        QuinceError::conflict(&key.data_id, &key.group, &key.tenant).into()
    } else {
        log_db_error(operation, err).into()
    }
}

/// Whether an error returned by a service call is a config identity conflict
pub fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<QuinceError>(),
        Some(QuinceError::ConfigConflict { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_conflict() {
        let err: anyhow::Error = QuinceError::conflict("a", "G", "").into();
        assert!(is_conflict(&err));

        let err: anyhow::Error = QuinceError::IllegalArgument("x".to_string()).into();
        assert!(!is_conflict(&err));

        let err: anyhow::Error = DbErr::Custom("boom".to_string()).into();
        assert!(!is_conflict(&err));
    }

    #[test]
    fn test_log_db_error_passes_through() {
        let err = log_db_error("test", DbErr::Custom("boom".to_string()));
        assert!(matches!(err, DbErr::Custom(ref msg) if msg == "boom"));
    }
}
