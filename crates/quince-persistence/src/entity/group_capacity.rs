//! Group capacity entity
//!
//! Limit columns hold 0 when the system default applies.
//! The row with an empty `group_id` tracks the whole cluster.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "group_capacity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub group_id: String,
    /// Maximum number of configs
    pub quota: i32,
    /// Current number of configs
    pub usage: i32,
    /// Maximum size of a single config in bytes
    pub max_size: i32,
    pub max_aggr_count: i32,
    pub max_aggr_size: i32,
    pub max_history_count: i32,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
