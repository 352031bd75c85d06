//! Capacity store over `group_capacity` and `tenant_capacity`
//!
//! Cluster and group scopes live in `group_capacity` (the cluster under the
//! empty group id), tenant scopes in `tenant_capacity`. Usage changes are
//! single conditional `UPDATE`s; success means exactly one row matched.

use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::{group_capacity, tenant_capacity};
use crate::model::{CapacityLimits, CapacityRecord, CapacityScope};
use crate::sql::{config, now};

/// Condition attached to a usage increment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageGuard {
    /// Always increment
    Unbounded,
    /// Row still on the default quota (stored 0) and usage below this default
    DefaultQuota(i32),
    /// Row has an explicit quota and usage is below it
    ExplicitQuota,
}

/// Column mapping shared by both capacity tables
pub trait CapacityTable: EntityTrait {
    type Row: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + 'static;

    const ID: Self::Column;
    const SCOPE: Self::Column;
    const QUOTA: Self::Column;
    const USAGE: Self::Column;
    const MAX_SIZE: Self::Column;
    const MAX_AGGR_COUNT: Self::Column;
    const MAX_AGGR_SIZE: Self::Column;
    const MAX_HISTORY_COUNT: Self::Column;
    const GMT_MODIFIED: Self::Column;

    fn into_record(model: Self::Model) -> CapacityRecord;

    fn new_row(
        scope_id: &str,
        limits: &CapacityLimits,
        usage: i32,
        time: chrono::NaiveDateTime,
    ) -> Self::Row;
}

impl CapacityTable for group_capacity::Entity {
    type Row = group_capacity::ActiveModel;

    const ID: Self::Column = group_capacity::Column::Id;
    const SCOPE: Self::Column = group_capacity::Column::GroupId;
    const QUOTA: Self::Column = group_capacity::Column::Quota;
    const USAGE: Self::Column = group_capacity::Column::Usage;
    const MAX_SIZE: Self::Column = group_capacity::Column::MaxSize;
    const MAX_AGGR_COUNT: Self::Column = group_capacity::Column::MaxAggrCount;
    const MAX_AGGR_SIZE: Self::Column = group_capacity::Column::MaxAggrSize;
    const MAX_HISTORY_COUNT: Self::Column = group_capacity::Column::MaxHistoryCount;
    const GMT_MODIFIED: Self::Column = group_capacity::Column::GmtModified;

    fn into_record(m: group_capacity::Model) -> CapacityRecord {
        CapacityRecord {
            id: m.id,
            scope_id: m.group_id,
            quota: m.quota,
            usage: m.usage,
            max_size: m.max_size,
            max_aggr_count: m.max_aggr_count,
            max_aggr_size: m.max_aggr_size,
            max_history_count: m.max_history_count,
            gmt_create: m.gmt_create,
            gmt_modified: m.gmt_modified,
        }
    }

    fn new_row(
        scope_id: &str,
        limits: &CapacityLimits,
        usage: i32,
        time: chrono::NaiveDateTime,
    ) -> group_capacity::ActiveModel {
        group_capacity::ActiveModel {
            group_id: Set(scope_id.to_string()),
            quota: Set(limits.quota.unwrap_or(0)),
            usage: Set(usage),
            max_size: Set(limits.max_size.unwrap_or(0)),
            max_aggr_count: Set(limits.max_aggr_count.unwrap_or(0)),
            max_aggr_size: Set(limits.max_aggr_size.unwrap_or(0)),
            max_history_count: Set(limits.max_history_count.unwrap_or(0)),
            gmt_create: Set(time),
            gmt_modified: Set(time),
            ..Default::default()
        }
    }
}

impl CapacityTable for tenant_capacity::Entity {
    type Row = tenant_capacity::ActiveModel;

    const ID: Self::Column = tenant_capacity::Column::Id;
    const SCOPE: Self::Column = tenant_capacity::Column::TenantId;
    const QUOTA: Self::Column = tenant_capacity::Column::Quota;
    const USAGE: Self::Column = tenant_capacity::Column::Usage;
    const MAX_SIZE: Self::Column = tenant_capacity::Column::MaxSize;
    const MAX_AGGR_COUNT: Self::Column = tenant_capacity::Column::MaxAggrCount;
    const MAX_AGGR_SIZE: Self::Column = tenant_capacity::Column::MaxAggrSize;
    const MAX_HISTORY_COUNT: Self::Column = tenant_capacity::Column::MaxHistoryCount;
    const GMT_MODIFIED: Self::Column = tenant_capacity::Column::GmtModified;

    fn into_record(m: tenant_capacity::Model) -> CapacityRecord {
        CapacityRecord {
            id: m.id,
            scope_id: m.tenant_id,
            quota: m.quota,
            usage: m.usage,
            max_size: m.max_size,
            max_aggr_count: m.max_aggr_count,
            max_aggr_size: m.max_aggr_size,
            max_history_count: m.max_history_count,
            gmt_create: m.gmt_create,
            gmt_modified: m.gmt_modified,
        }
    }

    fn new_row(
        scope_id: &str,
        limits: &CapacityLimits,
        usage: i32,
        time: chrono::NaiveDateTime,
    ) -> tenant_capacity::ActiveModel {
        tenant_capacity::ActiveModel {
            tenant_id: Set(scope_id.to_string()),
            quota: Set(limits.quota.unwrap_or(0)),
            usage: Set(usage),
            max_size: Set(limits.max_size.unwrap_or(0)),
            max_aggr_count: Set(limits.max_aggr_count.unwrap_or(0)),
            max_aggr_size: Set(limits.max_aggr_size.unwrap_or(0)),
            max_history_count: Set(limits.max_history_count.unwrap_or(0)),
            gmt_create: Set(time),
            gmt_modified: Set(time),
            ..Default::default()
        }
    }
}

// ============================================================================
// Table-generic statements
// ============================================================================

async fn find_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    scope_id: &str,
) -> Result<Option<CapacityRecord>, DbErr> {
    let model = E::find().filter(E::SCOPE.eq(scope_id)).one(conn).await?;
    Ok(model.map(E::into_record))
}

async fn insert_in<E, C>(
    conn: &C,
    scope_id: &str,
    limits: &CapacityLimits,
    usage: i32,
) -> Result<u64, DbErr>
where
    E: CapacityTable,
    E::Model: IntoActiveModel<E::Row>,
    C: ConnectionTrait,
{
    let row = E::new_row(scope_id, limits, usage, now());
    E::insert(row).exec_without_returning(conn).await
}

async fn increment_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    scope_id: &str,
    guard: UsageGuard,
) -> Result<bool, DbErr> {
    let update = E::update_many()
        .col_expr(E::USAGE, Expr::col(E::USAGE).add(1))
        .col_expr(E::GMT_MODIFIED, Expr::value(now()))
        .filter(E::SCOPE.eq(scope_id));

    let update = match guard {
        UsageGuard::Unbounded => update,
        UsageGuard::DefaultQuota(default_quota) => update
            .filter(E::QUOTA.eq(0))
            .filter(E::USAGE.lt(default_quota)),
        UsageGuard::ExplicitQuota => update
            .filter(E::QUOTA.ne(0))
            .filter(Expr::col(E::USAGE).lt(Expr::col(E::QUOTA))),
    };

    Ok(update.exec(conn).await?.rows_affected == 1)
}

async fn decrement_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    scope_id: &str,
) -> Result<bool, DbErr> {
    let result = E::update_many()
        .col_expr(E::USAGE, Expr::col(E::USAGE).sub(1))
        .col_expr(E::GMT_MODIFIED, Expr::value(now()))
        .filter(E::SCOPE.eq(scope_id))
        .filter(E::USAGE.gt(0))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

async fn set_usage_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    scope_id: &str,
    usage: i32,
) -> Result<bool, DbErr> {
    let result = E::update_many()
        .col_expr(E::USAGE, Expr::value(usage))
        .col_expr(E::GMT_MODIFIED, Expr::value(now()))
        .filter(E::SCOPE.eq(scope_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

async fn set_limits_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    scope_id: &str,
    limits: &CapacityLimits,
) -> Result<bool, DbErr> {
    let mut update = E::update_many().col_expr(E::GMT_MODIFIED, Expr::value(now()));
    for (column, value) in [
        (E::QUOTA, limits.quota),
        (E::MAX_SIZE, limits.max_size),
        (E::MAX_AGGR_COUNT, limits.max_aggr_count),
        (E::MAX_AGGR_SIZE, limits.max_aggr_size),
        (E::MAX_HISTORY_COUNT, limits.max_history_count),
    ] {
        if let Some(value) = value {
            update = update.col_expr(column, Expr::value(value));
        }
    }
    let result = update.filter(E::SCOPE.eq(scope_id)).exec(conn).await?;
    Ok(result.rows_affected == 1)
}

async fn find_after_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    last_id: i64,
    page_size: u64,
) -> Result<Vec<CapacityRecord>, DbErr> {
    let rows = E::find()
        .filter(E::ID.gt(last_id))
        .order_by_asc(E::ID)
        .limit(page_size)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(E::into_record).collect())
}

async fn delete_in<E: CapacityTable, C: ConnectionTrait>(
    conn: &C,
    scope_id: &str,
) -> Result<bool, DbErr> {
    let result = E::delete_many()
        .filter(E::SCOPE.eq(scope_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

// ============================================================================
// Scope API
// ============================================================================

pub async fn find<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
) -> Result<Option<CapacityRecord>, DbErr> {
    if scope.is_tenant() {
        find_in::<tenant_capacity::Entity, _>(conn, scope.scope_id()).await
    } else {
        find_in::<group_capacity::Entity, _>(conn, scope.scope_id()).await
    }
}

/// Insert a capacity row. Limits left `None` are stored as 0 (system default).
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
    limits: &CapacityLimits,
    usage: i32,
) -> Result<u64, DbErr> {
    if scope.is_tenant() {
        insert_in::<tenant_capacity::Entity, _>(conn, scope.scope_id(), limits, usage).await
    } else {
        insert_in::<group_capacity::Entity, _>(conn, scope.scope_id(), limits, usage).await
    }
}

/// `usage = usage + 1` under the given guard
pub async fn increment_usage<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
    guard: UsageGuard,
) -> Result<bool, DbErr> {
    if scope.is_tenant() {
        increment_in::<tenant_capacity::Entity, _>(conn, scope.scope_id(), guard).await
    } else {
        increment_in::<group_capacity::Entity, _>(conn, scope.scope_id(), guard).await
    }
}

/// `usage = usage - 1` while usage is positive
pub async fn decrement_usage<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
) -> Result<bool, DbErr> {
    if scope.is_tenant() {
        decrement_in::<tenant_capacity::Entity, _>(conn, scope.scope_id()).await
    } else {
        decrement_in::<group_capacity::Entity, _>(conn, scope.scope_id()).await
    }
}

pub async fn update_usage<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
    usage: i32,
) -> Result<bool, DbErr> {
    if scope.is_tenant() {
        set_usage_in::<tenant_capacity::Entity, _>(conn, scope.scope_id(), usage).await
    } else {
        set_usage_in::<group_capacity::Entity, _>(conn, scope.scope_id(), usage).await
    }
}

/// Overwrite the limits that are `Some`
pub async fn update_limits<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
    limits: &CapacityLimits,
) -> Result<bool, DbErr> {
    if scope.is_tenant() {
        set_limits_in::<tenant_capacity::Entity, _>(conn, scope.scope_id(), limits).await
    } else {
        set_limits_in::<group_capacity::Entity, _>(conn, scope.scope_id(), limits).await
    }
}

pub async fn delete<C: ConnectionTrait>(conn: &C, scope: &CapacityScope) -> Result<bool, DbErr> {
    if scope.is_tenant() {
        delete_in::<tenant_capacity::Entity, _>(conn, scope.scope_id()).await
    } else {
        delete_in::<group_capacity::Entity, _>(conn, scope.scope_id()).await
    }
}

/// `group_capacity` rows with id greater than `last_id`, cluster row included
pub async fn find_group_rows_after<C: ConnectionTrait>(
    conn: &C,
    last_id: i64,
    page_size: u64,
) -> Result<Vec<CapacityRecord>, DbErr> {
    find_after_in::<group_capacity::Entity, _>(conn, last_id, page_size).await
}

pub async fn find_tenant_rows_after<C: ConnectionTrait>(
    conn: &C,
    last_id: i64,
    page_size: u64,
) -> Result<Vec<CapacityRecord>, DbErr> {
    find_after_in::<tenant_capacity::Entity, _>(conn, last_id, page_size).await
}

/// Authoritative number of configs in a scope
pub async fn count_configs<C: ConnectionTrait>(
    conn: &C,
    scope: &CapacityScope,
) -> Result<u64, DbErr> {
    match scope {
        CapacityScope::Cluster => config::count(conn).await,
        CapacityScope::Group(group) => config::count_by_group(conn, group).await,
        CapacityScope::Tenant(tenant) => config::count_by_tenant(conn, tenant).await,
    }
}
