//! Tag relation store
//!
//! Tags are always written as a full replacement of a config's tag set.

use std::collections::HashMap;

use sea_orm::*;

use crate::entity::config_tags_relation;
use crate::model::ConfigKey;

/// Tag names of a config in insertion order
pub async fn find_tag_names<C: ConnectionTrait>(
    conn: &C,
    config_id: i64,
) -> Result<Vec<String>, DbErr> {
    config_tags_relation::Entity::find()
        .select_only()
        .column(config_tags_relation::Column::TagName)
        .filter(config_tags_relation::Column::Id.eq(config_id))
        .order_by_asc(config_tags_relation::Column::Nid)
        .into_tuple::<String>()
        .all(conn)
        .await
}

/// Tag names keyed by config id
pub async fn find_tag_names_by_ids<C: ConnectionTrait>(
    conn: &C,
    config_ids: &[i64],
) -> Result<HashMap<i64, Vec<String>>, DbErr> {
    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    if config_ids.is_empty() {
        return Ok(tags);
    }

    let rows = config_tags_relation::Entity::find()
        .filter(config_tags_relation::Column::Id.is_in(config_ids.iter().copied()))
        .order_by_asc(config_tags_relation::Column::Nid)
        .all(conn)
        .await?;
    for row in rows {
        tags.entry(row.id).or_default().push(row.tag_name);
    }
    Ok(tags)
}

/// Replace the tag set of a config. `tags` must already be normalized.
pub async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    config_id: i64,
    key: &ConfigKey,
    tags: &[String],
) -> Result<(), DbErr> {
    delete_tags(conn, config_id).await?;

    if tags.is_empty() {
        return Ok(());
    }

    let rows: Vec<config_tags_relation::ActiveModel> = tags
        .iter()
        .map(|tag| config_tags_relation::ActiveModel {
            id: Set(config_id),
            tag_name: Set(tag.clone()),
            tag_type: Set(None),
            data_id: Set(key.data_id.clone()),
            group_id: Set(key.group.clone()),
            tenant_id: Set(key.tenant.clone()),
            ..Default::default()
        })
        .collect();
    config_tags_relation::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn delete_tags<C: ConnectionTrait>(conn: &C, config_id: i64) -> Result<u64, DbErr> {
    let result = config_tags_relation::Entity::delete_many()
        .filter(config_tags_relation::Column::Id.eq(config_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::test_support::setup_db;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| ToString::to_string(s)).collect()
    }

    #[tokio::test]
    async fn test_replace_tags_is_full_replacement() {
        let db = setup_db().await;
        let key = ConfigKey::new("a.yaml", "G", "");

        replace_tags(&db, 1, &key, &tags(&["x", "y"])).await.unwrap();
        assert_eq!(find_tag_names(&db, 1).await.unwrap(), tags(&["x", "y"]));

        replace_tags(&db, 1, &key, &tags(&["z"])).await.unwrap();
        assert_eq!(find_tag_names(&db, 1).await.unwrap(), tags(&["z"]));

        replace_tags(&db, 1, &key, &[]).await.unwrap();
        assert!(find_tag_names(&db, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_tag_names_by_ids() {
        let db = setup_db().await;
        replace_tags(&db, 1, &ConfigKey::new("a", "G", ""), &tags(&["x"]))
            .await
            .unwrap();
        replace_tags(&db, 2, &ConfigKey::new("b", "G", ""), &tags(&["y", "z"]))
            .await
            .unwrap();

        let by_id = find_tag_names_by_ids(&db, &[1, 2, 3]).await.unwrap();
        assert_eq!(by_id.get(&1), Some(&tags(&["x"])));
        assert_eq!(by_id.get(&2), Some(&tags(&["y", "z"])));
        assert!(!by_id.contains_key(&3));
        assert_eq!(delete_tags(&db, 2).await.unwrap(), 2);
    }
}
