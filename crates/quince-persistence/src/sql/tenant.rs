//! Record store for the `tenant_info` namespace table
//!
//! Rows are keyed by `(kp, tenant_id)`, where `kp` names the owning platform.

use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::tenant_info;

fn by_kp_and_tenant(kp: &str, tenant_id: &str) -> Condition {
    Condition::all()
        .add(tenant_info::Column::Kp.eq(kp))
        .add(tenant_info::Column::TenantId.eq(tenant_id))
}

/// Insert a namespace row, returning its id
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    kp: &str,
    tenant_id: &str,
    tenant_name: &str,
    tenant_desc: Option<&str>,
    create_source: Option<&str>,
    time_millis: i64,
) -> Result<i64, DbErr> {
    let row = tenant_info::ActiveModel {
        id: NotSet,
        kp: Set(kp.to_string()),
        tenant_id: Set(tenant_id.to_string()),
        tenant_name: Set(tenant_name.to_string()),
        tenant_desc: Set(tenant_desc.map(str::to_string)),
        create_source: Set(create_source.map(str::to_string)),
        gmt_create: Set(time_millis),
        gmt_modified: Set(time_millis),
    };
    let result = tenant_info::Entity::insert(row).exec(conn).await?;
    Ok(result.last_insert_id)
}

/// Rename a namespace; `false` when no row matched
pub async fn update_name<C: ConnectionTrait>(
    conn: &C,
    kp: &str,
    tenant_id: &str,
    tenant_name: &str,
    tenant_desc: Option<&str>,
    time_millis: i64,
) -> Result<bool, DbErr> {
    let result = tenant_info::Entity::update_many()
        .col_expr(tenant_info::Column::TenantName, Expr::value(tenant_name))
        .col_expr(
            tenant_info::Column::TenantDesc,
            Expr::value(tenant_desc.map(str::to_string)),
        )
        .col_expr(tenant_info::Column::GmtModified, Expr::value(time_millis))
        .filter(by_kp_and_tenant(kp, tenant_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn find_by_kp<C: ConnectionTrait>(
    conn: &C,
    kp: &str,
) -> Result<Vec<tenant_info::Model>, DbErr> {
    tenant_info::Entity::find()
        .filter(tenant_info::Column::Kp.eq(kp))
        .order_by_asc(tenant_info::Column::Id)
        .all(conn)
        .await
}

pub async fn find_by_kp_and_tenant_id<C: ConnectionTrait>(
    conn: &C,
    kp: &str,
    tenant_id: &str,
) -> Result<Option<tenant_info::Model>, DbErr> {
    tenant_info::Entity::find()
        .filter(by_kp_and_tenant(kp, tenant_id))
        .one(conn)
        .await
}

pub async fn delete<C: ConnectionTrait>(conn: &C, kp: &str, tenant_id: &str) -> Result<u64, DbErr> {
    let result = tenant_info::Entity::delete_many()
        .filter(by_kp_and_tenant(kp, tenant_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Number of namespace rows using `tenant_id`, across every `kp`
pub async fn count_by_tenant_id<C: ConnectionTrait>(conn: &C, tenant_id: &str) -> Result<u64, DbErr> {
    tenant_info::Entity::find()
        .filter(tenant_info::Column::TenantId.eq(tenant_id))
        .count(conn)
        .await
}
