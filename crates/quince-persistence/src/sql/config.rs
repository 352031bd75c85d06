//! Record store for the primary `config_info` table

use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::config_info;
use crate::model::{ConfigKey, Page, page_offset};
use crate::sql::query::ConfigFilter;

fn by_key(key: &ConfigKey) -> Condition {
    Condition::all()
        .add(config_info::Column::DataId.eq(key.data_id.as_str()))
        .add(config_info::Column::GroupId.eq(key.group.as_str()))
        .add(config_info::Column::TenantId.eq(key.tenant.as_str()))
}

pub async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    key: &ConfigKey,
) -> Result<Option<config_info::Model>, DbErr> {
    config_info::Entity::find().filter(by_key(key)).one(conn).await
}

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<config_info::Model>, DbErr> {
    config_info::Entity::find_by_id(id).one(conn).await
}

pub async fn find_by_ids<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<config_info::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    config_info::Entity::find()
        .filter(config_info::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(config_info::Column::Id)
        .all(conn)
        .await
}

/// Insert a row and return the id assigned by the store
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    row: config_info::ActiveModel,
) -> Result<i64, DbErr> {
    let result = config_info::Entity::insert(row).exec(conn).await?;
    Ok(result.last_insert_id)
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    row: config_info::ActiveModel,
) -> Result<config_info::Model, DbErr> {
    row.update(conn).await
}

pub async fn delete_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> Result<u64, DbErr> {
    let result = config_info::Entity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected)
}

/// Paged listing, newest created first
pub async fn find_page<C: ConnectionTrait>(
    conn: &C,
    filter: &ConfigFilter,
    page_no: u64,
    page_size: u64,
) -> Result<Page<config_info::Model>, DbErr> {
    let total_count = config_info::Entity::find()
        .filter(filter.condition())
        .count(conn)
        .await?;

    if total_count == 0 {
        return Ok(Page::new(0, page_no, page_size, Vec::new()));
    }

    let page_items = config_info::Entity::find()
        .filter(filter.condition())
        .order_by_desc(config_info::Column::GmtCreate)
        .order_by_desc(config_info::Column::Id)
        .offset(page_offset(page_no, page_size))
        .limit(page_size)
        .all(conn)
        .await?;

    Ok(Page::new(total_count, page_no, page_size, page_items))
}

pub async fn find_all<C: ConnectionTrait>(
    conn: &C,
    filter: &ConfigFilter,
) -> Result<Vec<config_info::Model>, DbErr> {
    config_info::Entity::find()
        .filter(filter.condition())
        .order_by_asc(config_info::Column::Id)
        .all(conn)
        .await
}

/// Rows with id greater than `last_id`, ascending
pub async fn find_after<C: ConnectionTrait>(
    conn: &C,
    last_id: i64,
    page_size: u64,
) -> Result<Vec<config_info::Model>, DbErr> {
    config_info::Entity::find()
        .filter(config_info::Column::Id.gt(last_id))
        .order_by_asc(config_info::Column::Id)
        .limit(page_size)
        .all(conn)
        .await
}

/// `(id, data_id, group_id, tenant_id, md5)` of rows with id greater than
/// `last_id`, ascending. Content is not loaded.
pub async fn find_key_md5_after<C: ConnectionTrait>(
    conn: &C,
    last_id: i64,
    page_size: u64,
) -> Result<Vec<(i64, String, String, String, Option<String>)>, DbErr> {
    config_info::Entity::find()
        .select_only()
        .column(config_info::Column::Id)
        .column(config_info::Column::DataId)
        .column(config_info::Column::GroupId)
        .column(config_info::Column::TenantId)
        .column(config_info::Column::Md5)
        .filter(config_info::Column::Id.gt(last_id))
        .order_by_asc(config_info::Column::Id)
        .limit(page_size)
        .into_tuple()
        .all(conn)
        .await
}

/// Rows modified inside `[start, end]`
pub async fn find_modified_between<C: ConnectionTrait>(
    conn: &C,
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> Result<Vec<config_info::Model>, DbErr> {
    config_info::Entity::find()
        .filter(config_info::Column::GmtModified.between(start, end))
        .order_by_asc(config_info::Column::Id)
        .all(conn)
        .await
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    config_info::Entity::find().count(conn).await
}

pub async fn count_by_tenant<C: ConnectionTrait>(conn: &C, tenant: &str) -> Result<u64, DbErr> {
    config_info::Entity::find()
        .filter(config_info::Column::TenantId.eq(tenant))
        .count(conn)
        .await
}

/// Configs of a group in the default namespace
pub async fn count_by_group<C: ConnectionTrait>(conn: &C, group: &str) -> Result<u64, DbErr> {
    config_info::Entity::find()
        .filter(config_info::Column::GroupId.eq(group))
        .filter(config_info::Column::TenantId.eq(""))
        .count(conn)
        .await
}

pub async fn max_id<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let max = config_info::Entity::find()
        .select_only()
        .column_as(Expr::col(config_info::Column::Id).max(), "max_id")
        .into_tuple::<Option<i64>>()
        .one(conn)
        .await?;
    Ok(max.flatten().unwrap_or(0))
}

/// Distinct groups of the default namespace
pub async fn find_group_ids<C: ConnectionTrait>(
    conn: &C,
    page_no: u64,
    page_size: u64,
) -> Result<Vec<String>, DbErr> {
    config_info::Entity::find()
        .select_only()
        .column(config_info::Column::GroupId)
        .filter(config_info::Column::TenantId.eq(""))
        .group_by(config_info::Column::GroupId)
        .order_by_asc(config_info::Column::GroupId)
        .offset(page_offset(page_no, page_size))
        .limit(page_size)
        .into_tuple::<String>()
        .all(conn)
        .await
}

/// Distinct non-default tenants
pub async fn find_tenant_ids<C: ConnectionTrait>(
    conn: &C,
    page_no: u64,
    page_size: u64,
) -> Result<Vec<String>, DbErr> {
    config_info::Entity::find()
        .select_only()
        .column(config_info::Column::TenantId)
        .filter(config_info::Column::TenantId.ne(""))
        .group_by(config_info::Column::TenantId)
        .order_by_asc(config_info::Column::TenantId)
        .offset(page_offset(page_no, page_size))
        .limit(page_size)
        .into_tuple::<String>()
        .all(conn)
        .await
}
