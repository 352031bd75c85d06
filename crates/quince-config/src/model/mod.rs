//! Configuration data models
//!
//! - Write inputs (publish requests, operator, advanced options)
//! - Read views for primary, beta and tag configs and history entries
//! - Batch import policy and result
//! - Capacity settings and check results
//! - Namespace metadata

pub mod capacity;
pub mod config;
pub mod namespace;

pub use capacity::*;
pub use config::*;
pub use namespace::*;

pub use quince_persistence::{CapacityLimits, CapacityRecord, CapacityScope, ConfigKey, Page};
