//! Tag-scoped configuration entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "config_info_tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub data_id: String,
    pub group_id: String,
    pub tenant_id: String,
    /// Release tag this variant belongs to
    pub tag_id: String,
    pub app_name: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub md5: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub src_user: Option<String>,
    pub src_ip: Option<String>,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
