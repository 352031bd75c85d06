//! Namespace metadata models

use serde::{Deserialize, Serialize};

use quince_persistence::entity;

/// Platform key used when a caller does not name one
pub const DEFAULT_KP: &str = "1";

/// A namespace registered under a platform key (`kp`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub kp: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub tenant_desc: Option<String>,
    pub create_source: Option<String>,
    /// Epoch milliseconds
    pub gmt_create: i64,
    pub gmt_modified: i64,
}

impl From<entity::tenant_info::Model> for TenantInfo {
    fn from(value: entity::tenant_info::Model) -> Self {
        Self {
            kp: value.kp,
            tenant_id: value.tenant_id,
            tenant_name: value.tenant_name,
            tenant_desc: value.tenant_desc,
            create_source: value.create_source,
            gmt_create: value.gmt_create,
            gmt_modified: value.gmt_modified,
        }
    }
}
