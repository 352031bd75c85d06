//! Utility functions for Quince
//!
//! Identifier validation, tag normalization and content digests shared by
//! the persistence and service layers.

use std::sync::LazyLock;

use crate::error::QuinceError;
use crate::{IDENTIFIER_MAX_LEN, TENANT_MAX_LEN};

/// Regex pattern for validating identifiers (dataId, group, tenant)
static VALID_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new("^[a-zA-Z0-9_.:-]*$").expect("Invalid regex pattern"));

/// Validate a string contains only allowed characters
///
/// Allowed characters: alphanumeric, underscore, dot, colon, hyphen
///
/// # Examples
///
/// ```
/// use quince_common::is_valid;
///
/// assert!(is_valid("my-config.yaml"));
/// assert!(is_valid("app_name:v1"));
/// assert!(!is_valid("invalid/path"));
/// assert!(!is_valid("with spaces"));
/// ```
pub fn is_valid(str: &str) -> bool {
    VALID_PATTERN.is_match(str)
}

/// Lowercase hex MD5 of the content
///
/// ```
/// use quince_common::md5_digest;
///
/// assert_eq!(md5_digest(""), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
pub fn md5_digest(content: &str) -> String {
    format!("{:x}", md5::compute(content))
}

/// Split a comma-separated tag list, trimming entries and dropping blanks
/// and duplicates. First occurrence order is kept.
pub fn normalize_tags(config_tags: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in config_tags.split(',').map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Reject a malformed config identity or blank content before any write
pub fn check_identity(
    data_id: &str,
    group: &str,
    tenant: &str,
    content: &str,
) -> Result<(), QuinceError> {
    if data_id.trim().is_empty() {
        return Err(QuinceError::IllegalArgument("dataId is blank".to_string()));
    }
    if data_id.len() > IDENTIFIER_MAX_LEN || !is_valid(data_id) {
        return Err(QuinceError::IllegalArgument(format!(
            "invalid dataId: {}",
            data_id
        )));
    }
    if group.trim().is_empty() {
        return Err(QuinceError::IllegalArgument("group is blank".to_string()));
    }
    if group.len() > IDENTIFIER_MAX_LEN || !is_valid(group) {
        return Err(QuinceError::IllegalArgument(format!(
            "invalid group: {}",
            group
        )));
    }
    if tenant.len() > TENANT_MAX_LEN || !is_valid(tenant) {
        return Err(QuinceError::IllegalArgument(format!(
            "invalid tenant: {}",
            tenant
        )));
    }
    if content.trim().is_empty() {
        return Err(QuinceError::IllegalArgument(format!(
            "content is blank: dataId={}, group={}",
            data_id, group
        )));
    }
    Ok(())
}
