//! Config persistence service tests
//!
//! Write sequences, read paths and history queries against a migrated database.

mod common;

use common::{DEFAULT_GROUP, TEST_TENANT, TestDatabase, key, now, operator, publish, unique_data_id};
use quince_common::{QuinceError, md5_digest};
use quince_config::{ConfigFilter, Operator};
use sea_orm::{ConnectionTrait, DbErr};

#[tokio::test]
async fn test_upsert_then_read_digest_matches_content() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("digest");
    let content = "server:\n  port: 8080\n";

    let created = service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", content), &operator(), now())
        .await
        .unwrap();
    assert!(created);

    let info = service
        .find_config_info(&key(&data_id, DEFAULT_GROUP, ""))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.config_info_base.content, content);
    assert_eq!(info.config_info_base.md5, md5_digest(content));
}

#[tokio::test]
async fn test_upsert_twice_writes_insert_then_update_history() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("history");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    assert!(
        service
            .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", "v1"), &operator(), now())
            .await
            .unwrap()
    );
    let first = service.find_config_info(&config_key).await.unwrap().unwrap();

    assert!(
        !service
            .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", "v2"), &operator(), now())
            .await
            .unwrap()
    );
    let second = service.find_config_info(&config_key).await.unwrap().unwrap();
    assert_eq!(second.config_info_base.id, first.config_info_base.id);
    assert_eq!(second.config_info_base.content, "v2");
    assert_eq!(second.config_info_base.md5, md5_digest("v2"));

    let history = service.find_config_history(&config_key, 1, 10).await.unwrap();
    assert_eq!(history.total_count, 2);
    let newest = &history.page_items[0];
    let oldest = &history.page_items[1];
    assert_eq!(newest.op_type, "U");
    assert_eq!(newest.content, "v1");
    assert_eq!(oldest.op_type, "I");
    assert_eq!(oldest.content, "v1");
    assert_eq!(newest.config_id, first.config_info_base.id);
    assert_eq!(newest.src_user, "admin");
}

#[tokio::test]
async fn test_update_preserves_create_time_and_app_name() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("carry");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    let created_at = now() - chrono::Duration::hours(1);
    service
        .insert_or_update(
            &publish(&data_id, DEFAULT_GROUP, "", "v1").with_app_name("billing"),
            &operator(),
            created_at,
        )
        .await
        .unwrap();
    let before = service.find_config_all_info(&config_key).await.unwrap().unwrap();

    service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", "v2"), &operator(), now())
        .await
        .unwrap();
    let after = service.find_config_all_info(&config_key).await.unwrap().unwrap();

    assert_eq!(after.config_info.app_name, "billing");
    assert_eq!(after.create_time, before.create_time);
    assert!(after.modify_time > before.modify_time);
}

#[tokio::test]
async fn test_tag_replace_is_idempotent() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("tags");
    let config_key = key(&data_id, DEFAULT_GROUP, "");
    let request = publish(&data_id, DEFAULT_GROUP, "", "a: 1").with_tags("blue, green,blue,");

    service.insert_or_update(&request, &operator(), now()).await.unwrap();
    service.insert_or_update(&request, &operator(), now()).await.unwrap();

    let info = service.find_config_all_info(&config_key).await.unwrap().unwrap();
    assert_eq!(info.config_tags, "blue,green");
}

#[tokio::test]
async fn test_update_without_tags_keeps_existing_tags() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("keep-tags");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    service
        .insert_or_update(
            &publish(&data_id, DEFAULT_GROUP, "", "a: 1").with_tags("x,y"),
            &operator(),
            now(),
        )
        .await
        .unwrap();
    service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", "a: 2"), &operator(), now())
        .await
        .unwrap();
    let info = service.find_config_all_info(&config_key).await.unwrap().unwrap();
    assert_eq!(info.config_tags, "x,y");

    // An explicit empty list clears them
    service
        .insert_or_update(
            &publish(&data_id, DEFAULT_GROUP, "", "a: 3").with_tags(""),
            &operator(),
            now(),
        )
        .await
        .unwrap();
    let info = service.find_config_all_info(&config_key).await.unwrap().unwrap();
    assert_eq!(info.config_tags, "");
}

#[tokio::test]
async fn test_advance_info_round_trip() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("advance");
    let mut request = publish(&data_id, DEFAULT_GROUP, "", "a: 1").with_type("yaml");
    request.advance.desc = Some("payment settings".to_string());
    request.advance.effect = Some("restart".to_string());
    request.advance.config_tags = Some("pay".to_string());

    service.insert_or_update(&request, &operator(), now()).await.unwrap();

    let advance = service
        .find_config_advance_info(&key(&data_id, DEFAULT_GROUP, ""))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(advance.desc.as_deref(), Some("payment settings"));
    assert_eq!(advance.effect.as_deref(), Some("restart"));
    assert_eq!(advance.r#type.as_deref(), Some("yaml"));
    assert_eq!(advance.config_tags.as_deref(), Some("pay"));
    assert_eq!(advance.r#use, None);
}

#[tokio::test]
async fn test_invalid_identity_is_rejected_before_write() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    let err = service
        .insert_or_update(&publish("bad id", DEFAULT_GROUP, "", "x"), &operator(), now())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuinceError>(),
        Some(QuinceError::IllegalArgument(_))
    ));

    let err = service
        .insert_or_update(&publish("ok.yaml", DEFAULT_GROUP, "", "  "), &operator(), now())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuinceError>(),
        Some(QuinceError::IllegalArgument(_))
    ));

    assert_eq!(service.config_info_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_existing_identity_conflicts() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("conflict");
    let request = publish(&data_id, DEFAULT_GROUP, "", "a");

    service.add_config_info(&request, &operator(), now()).await.unwrap();
    let err = service
        .add_config_info(&request, &operator(), now())
        .await
        .unwrap_err();
    assert!(quince_config::service::is_conflict(&err));
    assert_eq!(service.config_info_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_missing_identity_is_not_found() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    let err = service
        .update_config_info(&publish("missing.yaml", DEFAULT_GROUP, "", "a"), &operator(), now())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuinceError>(),
        Some(QuinceError::ResourceNotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_missing_identity_is_noop() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let config_key = key("ghost.yaml", DEFAULT_GROUP, "");

    let removed = service
        .remove_config_info(&config_key, &operator(), now())
        .await
        .unwrap();
    assert!(removed.is_none());

    let history = service.find_config_history(&config_key, 1, 10).await.unwrap();
    assert_eq!(history.total_count, 0);
}

#[tokio::test]
async fn test_delete_removes_record_tags_and_writes_history() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("delete");
    let config_key = key(&data_id, DEFAULT_GROUP, TEST_TENANT);

    service
        .insert_or_update(
            &publish(&data_id, DEFAULT_GROUP, TEST_TENANT, "gone").with_tags("t1"),
            &operator(),
            now(),
        )
        .await
        .unwrap();

    let removed = service
        .remove_config_info(&config_key, &Operator::new("10.0.0.1", "admin"), now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.config_info_base.content, "gone");
    assert_eq!(removed.tenant, TEST_TENANT);
    assert!(service.find_config_info(&config_key).await.unwrap().is_none());

    let history = service.find_config_history(&config_key, 1, 10).await.unwrap();
    assert_eq!(history.total_count, 2);
    assert_eq!(history.page_items[0].op_type, "D");
    assert_eq!(history.page_items[0].content, "gone");
    assert_eq!(history.page_items[0].src_ip, "10.0.0.1");

    // Same identity again starts with no leftover tags
    service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, TEST_TENANT, "back"), &operator(), now())
        .await
        .unwrap();
    let info = service.find_config_all_info(&config_key).await.unwrap().unwrap();
    assert_eq!(info.config_tags, "");
}

#[tokio::test]
async fn test_remove_by_ids_returns_removed_records() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    let mut ids = Vec::new();
    for content in ["a", "b", "c"] {
        let id = service
            .add_config_info(
                &publish(&unique_data_id("batch"), DEFAULT_GROUP, "", content),
                &operator(),
                now(),
            )
            .await
            .unwrap();
        ids.push(id);
    }

    let removed = service
        .remove_config_info_by_ids(&[ids[0], ids[2], 9999], &operator(), now())
        .await
        .unwrap();
    let mut contents: Vec<_> = removed
        .iter()
        .map(|c| c.config_info_base.content.as_str())
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["a", "c"]);
    assert_eq!(service.config_info_count().await.unwrap(), 1);

    assert!(
        service
            .remove_config_info_by_ids(&[], &operator(), now())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_failed_history_write_rolls_back_update() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("rollback");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    service
        .insert_or_update(
            &publish(&data_id, DEFAULT_GROUP, "", "stable").with_tags("keep"),
            &operator(),
            now(),
        )
        .await
        .unwrap();

    db.connection
        .execute_unprepared("DROP TABLE his_config_info")
        .await
        .unwrap();

    let err = service
        .insert_or_update(
            &publish(&data_id, DEFAULT_GROUP, "", "broken").with_tags("other"),
            &operator(),
            now(),
        )
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<DbErr>().is_some());

    let info = service.find_config_all_info(&config_key).await.unwrap().unwrap();
    assert_eq!(info.config_info.config_info_base.content, "stable");
    assert_eq!(info.config_tags, "keep");
}

#[tokio::test]
async fn test_failed_history_write_rolls_back_insert_and_delete() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let existing = unique_data_id("existing");

    service
        .insert_or_update(&publish(&existing, DEFAULT_GROUP, "", "x"), &operator(), now())
        .await
        .unwrap();

    db.connection
        .execute_unprepared("DROP TABLE his_config_info")
        .await
        .unwrap();

    let fresh = unique_data_id("fresh");
    assert!(
        service
            .insert_or_update(
                &publish(&fresh, DEFAULT_GROUP, "", "y").with_tags("t"),
                &operator(),
                now(),
            )
            .await
            .is_err()
    );
    assert!(
        service
            .find_config_info(&key(&fresh, DEFAULT_GROUP, ""))
            .await
            .unwrap()
            .is_none()
    );

    assert!(
        service
            .remove_config_info(&key(&existing, DEFAULT_GROUP, ""), &operator(), now())
            .await
            .is_err()
    );
    assert!(
        service
            .find_config_info(&key(&existing, DEFAULT_GROUP, ""))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_page_filters_and_like_patterns() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    for (data_id, group, app) in [
        ("order-service.yaml", "ORDER", "order"),
        ("order-worker.yaml", "ORDER", "order"),
        ("user-service.yaml", "USER", "user"),
        ("user_100.yaml", "USER", "user"),
        ("userX100.yaml", "USER", "user"),
    ] {
        service
            .insert_or_update(
                &publish(data_id, group, "", "k: v").with_app_name(app),
                &operator(),
                now(),
            )
            .await
            .unwrap();
    }

    let page = service
        .find_config_info_page(1, 10, &ConfigFilter::new().group("ORDER"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    // Blank filters are ignored
    let page = service
        .find_config_info_page(1, 10, &ConfigFilter::new().group(" ").app_name(""))
        .await
        .unwrap();
    assert_eq!(page.total_count, 5);

    let page = service
        .find_config_info_page(1, 3, &ConfigFilter::new())
        .await
        .unwrap();
    assert_eq!(page.page_items.len(), 3);
    assert_eq!(page.pages_available, 2);

    let page = service
        .find_config_info_like_page(1, 10, &ConfigFilter::new().data_id("*-service*"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    // `_` and `%` are literal in patterns, only `*` is a wildcard
    let page = service
        .find_config_info_like_page(1, 10, &ConfigFilter::new().data_id("user_1*"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page_items[0].config_info_base.data_id, "user_100.yaml");

    let page = service
        .find_config_info_like_page(1, 10, &ConfigFilter::new().data_id("user%"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);

    let page = service
        .find_config_info_like_page(1, 10, &ConfigFilter::new().app_name("ord*"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn test_fragment_scan_by_last_id() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    for i in 0..5 {
        service
            .insert_or_update(
                &publish(&format!("frag-{}.properties", i), DEFAULT_GROUP, "", "a=1"),
                &operator(),
                now(),
            )
            .await
            .unwrap();
    }

    let mut last_id = 0;
    let mut seen = Vec::new();
    loop {
        let fragment = service.find_all_config_info_fragment(last_id, 2).await.unwrap();
        let Some(last) = fragment.last() else {
            break;
        };
        last_id = last.config_info_base.id;
        seen.extend(fragment.into_iter().map(|c| c.config_info_base.data_id));
    }
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], "frag-0.properties");
    assert_eq!(service.find_config_max_id().await.unwrap(), last_id);
}

#[tokio::test]
async fn test_export_prefers_ids_and_merges_tags() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    let tagged = service
        .add_config_info(
            &publish("a.yaml", DEFAULT_GROUP, "", "a").with_tags("one,two"),
            &operator(),
            now(),
        )
        .await
        .unwrap();
    service
        .add_config_info(&publish("b.yaml", "OTHER", "", "b"), &operator(), now())
        .await
        .unwrap();

    let exported = service
        .find_all_config_info_for_export(&ConfigFilter::new().group("OTHER"), &[tagged])
        .await
        .unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].config_info.config_info_base.data_id, "a.yaml");
    assert_eq!(exported[0].config_tags, "one,two");

    let exported = service
        .find_all_config_info_for_export(&ConfigFilter::new().group("OTHER"), &[])
        .await
        .unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].config_info.config_info_base.data_id, "b.yaml");

    let found = service.find_configs_by_ids(&[tagged]).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_counts_and_scope_enumeration() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();

    for (data_id, group, tenant) in [
        ("a.yaml", "G1", ""),
        ("b.yaml", "G2", ""),
        ("c.yaml", "G2", ""),
        ("d.yaml", "G1", "t1"),
        ("e.yaml", "G1", "t2"),
    ] {
        service
            .insert_or_update(&publish(data_id, group, tenant, "x"), &operator(), now())
            .await
            .unwrap();
    }

    assert_eq!(service.config_info_count().await.unwrap(), 5);
    assert_eq!(service.config_info_count_by_tenant("t1").await.unwrap(), 1);
    assert_eq!(service.config_info_count_by_tenant("").await.unwrap(), 3);
    assert_eq!(service.get_group_id_list(1, 10).await.unwrap(), vec!["G1", "G2"]);
    assert_eq!(service.get_tenant_id_list(1, 10).await.unwrap(), vec!["t1", "t2"]);
    assert_eq!(service.get_tenant_id_list(2, 1).await.unwrap(), vec!["t2"]);
}

#[tokio::test]
async fn test_beta_variant_lifecycle() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("beta");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    let err = service.find_config_info_beta(&config_key).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuinceError>(),
        Some(QuinceError::ResourceNotFound(_))
    ));

    let request = publish(&data_id, DEFAULT_GROUP, "", "beta-1");
    assert!(
        service
            .insert_or_update_beta(&request, "10.0.0.1", &operator(), now())
            .await
            .unwrap()
    );
    let request = publish(&data_id, DEFAULT_GROUP, "", "beta-2");
    assert!(
        !service
            .insert_or_update_beta(&request, "10.0.0.1,10.0.0.2", &operator(), now())
            .await
            .unwrap()
    );

    let beta = service.find_config_info_beta(&config_key).await.unwrap();
    assert_eq!(beta.config_info.config_info_base.content, "beta-2");
    assert_eq!(beta.config_info.config_info_base.md5, md5_digest("beta-2"));
    assert_eq!(beta.beta_ips, "10.0.0.1,10.0.0.2");
    assert_eq!(service.config_info_beta_count().await.unwrap(), 1);
    assert_eq!(service.find_all_config_info_beta(1, 10).await.unwrap().total_count, 1);

    // The primary record is untouched
    assert!(service.find_config_info(&config_key).await.unwrap().is_none());

    assert!(service.remove_config_info_beta(&config_key).await.unwrap());
    assert!(!service.remove_config_info_beta(&config_key).await.unwrap());
}

#[tokio::test]
async fn test_tag_variant_lifecycle() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("tagged");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    let request = publish(&data_id, DEFAULT_GROUP, "", "canary");
    assert!(
        service
            .insert_or_update_tag(&request, "canary", &operator(), now())
            .await
            .unwrap()
    );
    assert!(
        service
            .insert_or_update_tag(&request, "stable", &operator(), now())
            .await
            .unwrap()
    );
    assert!(
        !service
            .insert_or_update_tag(&request, "canary", &operator(), now())
            .await
            .unwrap()
    );
    assert!(
        service
            .insert_or_update_tag(&request, " ", &operator(), now())
            .await
            .is_err()
    );

    let tagged = service.find_config_info_tag(&config_key, "canary").await.unwrap();
    assert_eq!(tagged.tag, "canary");
    assert_eq!(service.config_info_tag_count().await.unwrap(), 2);
    assert_eq!(service.find_all_config_info_tag(1, 1).await.unwrap().pages_available, 2);

    assert!(service.remove_config_info_tag(&config_key, "canary").await.unwrap());
    assert!(service.find_config_info_tag(&config_key, "canary").await.is_err());
}

#[tokio::test]
async fn test_history_detail_and_previous() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("detail");
    let config_key = key(&data_id, DEFAULT_GROUP, "");

    for content in ["v1", "v2", "v3"] {
        service
            .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", content), &operator(), now())
            .await
            .unwrap();
    }

    let history = service.find_config_history(&config_key, 1, 10).await.unwrap();
    assert_eq!(history.total_count, 3);
    let newest = &history.page_items[0];

    let detail = service.detail_config_history(newest.id).await.unwrap();
    assert_eq!(detail.content, "v2");

    let previous = service
        .get_previous_config_history(&config_key, newest.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(previous.id, history.page_items[1].id);
    assert_eq!(previous.content, "v1");

    let oldest = &history.page_items[2];
    assert!(
        service
            .get_previous_config_history(&config_key, oldest.id)
            .await
            .unwrap()
            .is_none()
    );

    // The entry must belong to the given identity
    assert!(
        service
            .get_previous_config_history(&key("other.yaml", DEFAULT_GROUP, ""), newest.id)
            .await
            .is_err()
    );
    assert!(service.detail_config_history(987_654).await.is_err());
}

#[tokio::test]
async fn test_changed_and_deleted_windows() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let start = now() - chrono::Duration::minutes(1);

    service
        .insert_or_update(&publish("kept.yaml", DEFAULT_GROUP, "", "k"), &operator(), now())
        .await
        .unwrap();
    service
        .insert_or_update(&publish("dropped.yaml", DEFAULT_GROUP, "", "d"), &operator(), now())
        .await
        .unwrap();
    service
        .remove_config_info(&key("dropped.yaml", DEFAULT_GROUP, ""), &operator(), now())
        .await
        .unwrap();
    let end = now() + chrono::Duration::minutes(1);

    let changed = service.find_changed_config(start, end).await.unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].data_id, "kept.yaml");

    let deleted = service.find_deleted_config(start, end).await.unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].data_id, "dropped.yaml");

    let later = end + chrono::Duration::hours(1);
    assert!(service.find_changed_config(end, later).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_history_purge_is_bounded() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let old = now() - chrono::Duration::days(40);
    let data_id = unique_data_id("purge");

    for content in ["v1", "v2", "v3", "v4"] {
        service
            .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", content), &operator(), old)
            .await
            .unwrap();
    }
    service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", "v5"), &operator(), now())
        .await
        .unwrap();

    let cutoff = now() - chrono::Duration::days(30);
    assert_eq!(service.find_config_history_count_by_time(cutoff).await.unwrap(), 4);
    assert_eq!(service.remove_config_history(cutoff, 3).await.unwrap(), 3);
    assert_eq!(service.remove_config_history(cutoff, 3).await.unwrap(), 1);
    assert_eq!(service.find_config_history_count_by_time(cutoff).await.unwrap(), 0);

    let history = service
        .find_config_history(&key(&data_id, DEFAULT_GROUP, ""), 1, 10)
        .await
        .unwrap();
    assert_eq!(history.total_count, 1);
}

#[tokio::test]
async fn test_point_reads_by_id_and_base() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    let data_id = unique_data_id("base");

    service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, "", "a: 1"), &operator(), now())
        .await
        .unwrap();
    service
        .insert_or_update(&publish(&data_id, DEFAULT_GROUP, TEST_TENANT, "b: 2"), &operator(), now())
        .await
        .unwrap();

    let base = service
        .find_config_info_base(&data_id, DEFAULT_GROUP)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(base.content, "a: 1");
    assert_eq!(base.md5, md5_digest("a: 1"));
    assert!(service.find_config_info_base(&data_id, "OTHER").await.unwrap().is_none());

    let by_id = service.find_config_info_by_id(base.id).await.unwrap().unwrap();
    assert_eq!(by_id.key(), key(&data_id, DEFAULT_GROUP, ""));
    assert!(service.find_config_info_by_id(base.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_all_group_key_md5() {
    let db = TestDatabase::sqlite().await.unwrap();
    let service = db.config_service();
    assert!(service.list_all_group_key_md5().await.unwrap().is_empty());

    for (data_id, tenant, content) in [("one.yaml", "", "1"), ("two.yaml", TEST_TENANT, "2")] {
        service
            .insert_or_update(&publish(data_id, DEFAULT_GROUP, tenant, content), &operator(), now())
            .await
            .unwrap();
    }

    let listed = service.list_all_group_key_md5().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].data_id, "one.yaml");
    assert_eq!(listed[0].md5, md5_digest("1"));
    assert_eq!(listed[1].tenant, TEST_TENANT);
    assert_eq!(listed[1].group, DEFAULT_GROUP);
    assert_eq!(listed[1].md5, md5_digest("2"));
}
