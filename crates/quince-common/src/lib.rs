//! Quince Common - Shared types and utilities
//!
//! This crate provides the foundational pieces used by every Quince component:
//! - Error types and error codes
//! - Identifier validation and content digests
//! - Common constants

pub mod error;
pub mod utils;

pub use error::{ErrorCode, QuinceError};
pub use utils::{check_identity, is_valid, md5_digest, normalize_tags};

/// Group id under which the cluster-wide capacity row is stored
pub const CLUSTER: &str = "";

/// Maximum accepted tenant id length
pub const TENANT_MAX_LEN: usize = 128;

/// Maximum accepted dataId/group length
pub const IDENTIFIER_MAX_LEN: usize = 256;
