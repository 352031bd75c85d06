//! Append-only history log over `his_config_info`

use sea_orm::*;

use crate::entity::{config_info, his_config_info};
use crate::model::{ConfigKey, OpType, Page, page_offset};

/// Build a history row from a config snapshot
pub fn entry_from_snapshot(
    snapshot: &config_info::Model,
    op_type: OpType,
    src_ip: Option<&str>,
    src_user: Option<&str>,
    time: chrono::NaiveDateTime,
) -> his_config_info::ActiveModel {
    his_config_info::ActiveModel {
        id: Set(snapshot.id),
        data_id: Set(snapshot.data_id.clone()),
        group_id: Set(snapshot.group_id.clone()),
        tenant_id: Set(snapshot.tenant_id.clone()),
        app_name: Set(snapshot.app_name.clone()),
        content: Set(snapshot.content.clone()),
        md5: Set(snapshot.md5.clone()),
        src_user: Set(src_user.map(str::to_string)),
        src_ip: Set(src_ip.map(str::to_string)),
        op_type: Set(op_type.as_str().to_string()),
        gmt_create: Set(time),
        gmt_modified: Set(time),
        ..Default::default()
    }
}

/// Append an entry and return its sequence id
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    row: his_config_info::ActiveModel,
) -> Result<i64, DbErr> {
    let result = his_config_info::Entity::insert(row).exec(conn).await?;
    Ok(result.last_insert_id)
}

/// Entries of one identity, newest first
pub async fn find_page<C: ConnectionTrait>(
    conn: &C,
    key: &ConfigKey,
    page_no: u64,
    page_size: u64,
) -> Result<Page<his_config_info::Model>, DbErr> {
    let condition = Condition::all()
        .add(his_config_info::Column::DataId.eq(key.data_id.as_str()))
        .add(his_config_info::Column::GroupId.eq(key.group.as_str()))
        .add(his_config_info::Column::TenantId.eq(key.tenant.as_str()));

    let total_count = his_config_info::Entity::find()
        .filter(condition.clone())
        .count(conn)
        .await?;

    if total_count == 0 {
        return Ok(Page::new(0, page_no, page_size, Vec::new()));
    }

    let page_items = his_config_info::Entity::find()
        .filter(condition)
        .order_by_desc(his_config_info::Column::Nid)
        .offset(page_offset(page_no, page_size))
        .limit(page_size)
        .all(conn)
        .await?;

    Ok(Page::new(total_count, page_no, page_size, page_items))
}

pub async fn find_by_nid<C: ConnectionTrait>(
    conn: &C,
    nid: i64,
) -> Result<Option<his_config_info::Model>, DbErr> {
    his_config_info::Entity::find_by_id(nid).one(conn).await
}

/// Latest entry of a config written before `nid`
pub async fn find_previous<C: ConnectionTrait>(
    conn: &C,
    config_id: i64,
    nid: i64,
) -> Result<Option<his_config_info::Model>, DbErr> {
    his_config_info::Entity::find()
        .filter(his_config_info::Column::Id.eq(config_id))
        .filter(his_config_info::Column::Nid.lt(nid))
        .order_by_desc(his_config_info::Column::Nid)
        .one(conn)
        .await
}

/// Entries of deletes written inside `[start, end]`
pub async fn find_deleted_between<C: ConnectionTrait>(
    conn: &C,
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> Result<Vec<his_config_info::Model>, DbErr> {
    his_config_info::Entity::find()
        .filter(his_config_info::Column::OpType.eq(OpType::Delete.as_str()))
        .filter(his_config_info::Column::GmtModified.between(start, end))
        .order_by_asc(his_config_info::Column::Nid)
        .all(conn)
        .await
}

/// Purge at most `limit` entries older than `before`, oldest first
pub async fn delete_before<C: ConnectionTrait>(
    conn: &C,
    before: chrono::NaiveDateTime,
    limit: u64,
) -> Result<u64, DbErr> {
    let nids = his_config_info::Entity::find()
        .select_only()
        .column(his_config_info::Column::Nid)
        .filter(his_config_info::Column::GmtModified.lt(before))
        .order_by_asc(his_config_info::Column::Nid)
        .limit(limit)
        .into_tuple::<i64>()
        .all(conn)
        .await?;

    if nids.is_empty() {
        return Ok(0);
    }

    let result = his_config_info::Entity::delete_many()
        .filter(his_config_info::Column::Nid.is_in(nids))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn count_before<C: ConnectionTrait>(
    conn: &C,
    before: chrono::NaiveDateTime,
) -> Result<u64, DbErr> {
    his_config_info::Entity::find()
        .filter(his_config_info::Column::GmtModified.lt(before))
        .count(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::test_support::setup_db;
    use chrono::{Duration, NaiveDate};

    fn snapshot(content: &str) -> config_info::Model {
        let time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        config_info::Model {
            id: 7,
            data_id: "a.yaml".to_string(),
            group_id: "G".to_string(),
            tenant_id: String::new(),
            content: content.to_string(),
            md5: Some(quince_common::md5_digest(content)),
            app_name: None,
            c_desc: None,
            c_use: None,
            effect: None,
            r#type: None,
            c_schema: None,
            src_user: None,
            src_ip: None,
            gmt_create: time,
            gmt_modified: time,
        }
    }

    fn day(d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_page_is_newest_first() {
        let db = setup_db().await;
        let key = ConfigKey::new("a.yaml", "G", "");
        for (i, op) in [OpType::Insert, OpType::Update, OpType::Update].iter().enumerate() {
            let row = entry_from_snapshot(&snapshot(&format!("v{}", i)), *op, None, None, day(1));
            insert(&db, row).await.unwrap();
        }

        let page = find_page(&db, &key, 1, 2).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_items[0].content, "v2");
        assert_eq!(page.page_items[1].content, "v1");

        let previous = find_previous(&db, 7, page.page_items[0].nid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.content, "v1");
    }

    #[tokio::test]
    async fn test_time_bounded_queries() {
        let db = setup_db().await;
        for d in 1..=4 {
            let op = if d == 3 { OpType::Delete } else { OpType::Update };
            let row = entry_from_snapshot(&snapshot("v"), op, Some("127.0.0.1"), None, day(d));
            insert(&db, row).await.unwrap();
        }

        let deleted = find_deleted_between(&db, day(2), day(4)).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].op_type, "D");

        let cutoff = day(3) + Duration::hours(1);
        assert_eq!(count_before(&db, cutoff).await.unwrap(), 3);
        assert_eq!(delete_before(&db, cutoff, 2).await.unwrap(), 2);
        assert_eq!(count_before(&db, cutoff).await.unwrap(), 1);
        assert_eq!(delete_before(&db, cutoff, 10).await.unwrap(), 1);
        assert_eq!(delete_before(&db, cutoff, 10).await.unwrap(), 0);
    }
}
