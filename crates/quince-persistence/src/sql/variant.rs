//! Record stores for the beta and tag variants of a config

use sea_orm::*;

use crate::entity::{config_info_beta, config_info_tag};
use crate::model::{ConfigKey, Page, page_offset};

// ============================================================================
// Beta
// ============================================================================

pub async fn find_beta<C: ConnectionTrait>(
    conn: &C,
    key: &ConfigKey,
) -> Result<Option<config_info_beta::Model>, DbErr> {
    config_info_beta::Entity::find()
        .filter(config_info_beta::Column::DataId.eq(key.data_id.as_str()))
        .filter(config_info_beta::Column::GroupId.eq(key.group.as_str()))
        .filter(config_info_beta::Column::TenantId.eq(key.tenant.as_str()))
        .one(conn)
        .await
}

pub async fn insert_beta<C: ConnectionTrait>(
    conn: &C,
    row: config_info_beta::ActiveModel,
) -> Result<i64, DbErr> {
    let result = config_info_beta::Entity::insert(row).exec(conn).await?;
    Ok(result.last_insert_id)
}

pub async fn update_beta<C: ConnectionTrait>(
    conn: &C,
    row: config_info_beta::ActiveModel,
) -> Result<config_info_beta::Model, DbErr> {
    row.update(conn).await
}

pub async fn delete_beta<C: ConnectionTrait>(conn: &C, key: &ConfigKey) -> Result<u64, DbErr> {
    let result = config_info_beta::Entity::delete_many()
        .filter(config_info_beta::Column::DataId.eq(key.data_id.as_str()))
        .filter(config_info_beta::Column::GroupId.eq(key.group.as_str()))
        .filter(config_info_beta::Column::TenantId.eq(key.tenant.as_str()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn count_beta<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    config_info_beta::Entity::find().count(conn).await
}

pub async fn find_beta_page<C: ConnectionTrait>(
    conn: &C,
    page_no: u64,
    page_size: u64,
) -> Result<Page<config_info_beta::Model>, DbErr> {
    let total_count = count_beta(conn).await?;
    let page_items = config_info_beta::Entity::find()
        .order_by_asc(config_info_beta::Column::Id)
        .offset(page_offset(page_no, page_size))
        .limit(page_size)
        .all(conn)
        .await?;
    Ok(Page::new(total_count, page_no, page_size, page_items))
}

// ============================================================================
// Tag
// ============================================================================

pub async fn find_tag<C: ConnectionTrait>(
    conn: &C,
    key: &ConfigKey,
    tag: &str,
) -> Result<Option<config_info_tag::Model>, DbErr> {
    config_info_tag::Entity::find()
        .filter(config_info_tag::Column::DataId.eq(key.data_id.as_str()))
        .filter(config_info_tag::Column::GroupId.eq(key.group.as_str()))
        .filter(config_info_tag::Column::TenantId.eq(key.tenant.as_str()))
        .filter(config_info_tag::Column::TagId.eq(tag))
        .one(conn)
        .await
}

pub async fn insert_tag<C: ConnectionTrait>(
    conn: &C,
    row: config_info_tag::ActiveModel,
) -> Result<i64, DbErr> {
    let result = config_info_tag::Entity::insert(row).exec(conn).await?;
    Ok(result.last_insert_id)
}

pub async fn update_tag<C: ConnectionTrait>(
    conn: &C,
    row: config_info_tag::ActiveModel,
) -> Result<config_info_tag::Model, DbErr> {
    row.update(conn).await
}

pub async fn delete_tag<C: ConnectionTrait>(
    conn: &C,
    key: &ConfigKey,
    tag: &str,
) -> Result<u64, DbErr> {
    let result = config_info_tag::Entity::delete_many()
        .filter(config_info_tag::Column::DataId.eq(key.data_id.as_str()))
        .filter(config_info_tag::Column::GroupId.eq(key.group.as_str()))
        .filter(config_info_tag::Column::TenantId.eq(key.tenant.as_str()))
        .filter(config_info_tag::Column::TagId.eq(tag))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn count_tag<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    config_info_tag::Entity::find().count(conn).await
}

pub async fn find_tag_page<C: ConnectionTrait>(
    conn: &C,
    page_no: u64,
    page_size: u64,
) -> Result<Page<config_info_tag::Model>, DbErr> {
    let total_count = count_tag(conn).await?;
    let page_items = config_info_tag::Entity::find()
        .order_by_asc(config_info_tag::Column::Id)
        .offset(page_offset(page_no, page_size))
        .limit(page_size)
        .all(conn)
        .await?;
    Ok(Page::new(total_count, page_no, page_size, page_items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{is_unique_violation, now, test_support::setup_db};

    fn tag_row(key: &ConfigKey, tag: &str) -> config_info_tag::ActiveModel {
        let now = now();
        config_info_tag::ActiveModel {
            data_id: Set(key.data_id.clone()),
            group_id: Set(key.group.clone()),
            tenant_id: Set(key.tenant.clone()),
            tag_id: Set(tag.to_string()),
            content: Set("k=v".to_string()),
            gmt_create: Set(now),
            gmt_modified: Set(now),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_tag_variant_keyed_by_tag() {
        let db = setup_db().await;
        let key = ConfigKey::new("a.yaml", "G", "");

        insert_tag(&db, tag_row(&key, "gray")).await.unwrap();
        insert_tag(&db, tag_row(&key, "canary")).await.unwrap();
        let err = insert_tag(&db, tag_row(&key, "gray")).await.unwrap_err();
        assert!(is_unique_violation(&err));

        assert!(find_tag(&db, &key, "gray").await.unwrap().is_some());
        assert_eq!(count_tag(&db).await.unwrap(), 2);
        assert_eq!(delete_tag(&db, &key, "gray").await.unwrap(), 1);
        assert!(find_tag(&db, &key, "gray").await.unwrap().is_none());
        assert_eq!(find_tag_page(&db, 1, 10).await.unwrap().page_items.len(), 1);
    }

    #[tokio::test]
    async fn test_beta_round_trip() {
        let db = setup_db().await;
        let key = ConfigKey::new("a.yaml", "G", "ns");
        let now = now();
        insert_beta(
            &db,
            config_info_beta::ActiveModel {
                data_id: Set(key.data_id.clone()),
                group_id: Set(key.group.clone()),
                tenant_id: Set(key.tenant.clone()),
                content: Set("beta".to_string()),
                beta_ips: Set(Some("10.0.0.1".to_string())),
                gmt_create: Set(now),
                gmt_modified: Set(now),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let beta = find_beta(&db, &key).await.unwrap().unwrap();
        assert_eq!(beta.beta_ips.as_deref(), Some("10.0.0.1"));
        assert_eq!(count_beta(&db).await.unwrap(), 1);
        assert_eq!(delete_beta(&db, &key).await.unwrap(), 1);
        assert_eq!(delete_beta(&db, &key).await.unwrap(), 0);
    }
}
