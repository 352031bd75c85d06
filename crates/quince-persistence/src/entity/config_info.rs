//! Primary configuration entity
//!
//! One row per (dataId, group, tenant) identity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "config_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Configuration data ID
    pub data_id: String,
    /// Configuration group
    pub group_id: String,
    /// Tenant/Namespace ID, empty for the default namespace
    pub tenant_id: String,
    /// Configuration content
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// MD5 hash of content
    pub md5: Option<String>,
    /// Application name
    pub app_name: Option<String>,
    /// Description
    pub c_desc: Option<String>,
    /// Usage class
    pub c_use: Option<String>,
    pub effect: Option<String>,
    /// Declared content type (yaml, properties, json, ...)
    pub r#type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub c_schema: Option<String>,
    /// User who last wrote the config
    #[sea_orm(column_type = "Text", nullable)]
    pub src_user: Option<String>,
    /// Client IP of the last write
    pub src_ip: Option<String>,
    /// Creation timestamp
    pub gmt_create: DateTime,
    /// Modification timestamp
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
