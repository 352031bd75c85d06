//! Configuration history entity
//!
//! Append-only log of config writes. `op_type` is one of `I`, `U`, `D`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "his_config_info")]
pub struct Model {
    /// History sequence id
    #[sea_orm(primary_key)]
    pub nid: i64,
    /// Id of the config row the entry was taken from
    pub id: i64,
    pub data_id: String,
    pub group_id: String,
    pub tenant_id: String,
    pub app_name: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub md5: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub src_user: Option<String>,
    pub src_ip: Option<String>,
    /// Operation type: I (insert), U (update), D (delete)
    pub op_type: String,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
