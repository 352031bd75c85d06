//! SQL stores over the SeaORM entities
//!
//! Every function is generic over `ConnectionTrait`, so callers pass either a
//! pooled `DatabaseConnection` or a `DatabaseTransaction` for multi-step writes.

pub mod capacity;
pub mod config;
pub mod history;
pub mod query;
pub mod tags;
pub mod tenant;
pub mod variant;

use sea_orm::{DbErr, SqlErr};

/// Whether the error is a unique-key violation
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Whether the error means the storage engine could not be reached
pub fn is_connection_error(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// Current local timestamp used for gmt_create/gmt_modified columns
pub fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
