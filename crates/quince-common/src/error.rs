//! Error types and error codes for Quince
//!
//! This module defines:
//! - `QuinceError`: Application-specific error enum
//! - `ErrorCode`: Structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuinceError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("config already exists: dataId={data_id}, group={group}, tenant={tenant}")]
    ConfigConflict {
        data_id: String,
        group: String,
        tenant: String,
    },

    #[error("namespace already exists: {0}")]
    NamespaceConflict(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),
}

impl QuinceError {
    pub fn conflict(data_id: &str, group: &str, tenant: &str) -> Self {
        QuinceError::ConfigConflict {
            data_id: data_id.to_string(),
            group: group.to_string(),
            tenant: tenant.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode<'static> {
        match self {
            QuinceError::IllegalArgument(_) => PARAMETER_VALIDATE_ERROR,
            QuinceError::ConfigConflict { .. } | QuinceError::NamespaceConflict(_) => {
                RESOURCE_CONFLICT
            }
            QuinceError::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
        }
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

// Capacity errors
pub const OVER_CLUSTER_QUOTA: ErrorCode<'static> = ErrorCode {
    code: 5031,
    message: "cluster capacity reach quota",
};

pub const OVER_GROUP_QUOTA: ErrorCode<'static> = ErrorCode {
    code: 5032,
    message: "group capacity reach quota",
};

pub const OVER_TENANT_QUOTA: ErrorCode<'static> = ErrorCode {
    code: 5033,
    message: "tenant capacity reach quota",
};

pub const OVER_MAX_SIZE: ErrorCode<'static> = ErrorCode {
    code: 5034,
    message: "config content size is over limit",
};
