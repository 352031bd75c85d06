//! Quince Persistence - Database entities and record stores
//!
//! This crate provides:
//! - SeaORM entity definitions for config, variant, tag, history, capacity and
//!   namespace tables
//! - Connection-generic stores used inside and outside transactions
//! - Domain model types shared with the service layer

pub mod entity;
pub mod model;
pub mod sql;

// Re-export sea-orm for convenience
pub use sea_orm;

pub use entity::prelude::*;
pub use model::{CapacityLimits, CapacityRecord, CapacityScope, ConfigKey, OpType, Page};
pub use sql::query::ConfigFilter;
