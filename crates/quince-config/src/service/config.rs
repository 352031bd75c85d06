//! Config persistence service
//!
//! Write sequences run inside one transaction: the record, its tag relations
//! and the history entry commit together or roll back together. Every read
//! goes back to the database.

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveValue::NotSet, DatabaseConnection, DatabaseTransaction, IntoActiveModel, Set,
    TransactionTrait,
};

use quince_common::{QuinceError, check_identity, md5_digest, normalize_tags};
use quince_persistence::ConfigFilter;
use quince_persistence::entity::{config_info, config_info_beta, config_info_tag};
use quince_persistence::model::{ConfigKey, OpType, Page};
use quince_persistence::sql::{config, history, tags, variant};

use crate::model::{
    ConfigAdvanceInfo, ConfigAllInfo, ConfigInfo, ConfigInfoBase, ConfigInfoBeta, ConfigInfoTag,
    ConfigKeyMd5, ConfigPublish, Operator,
};
use crate::service::{conflict_or_db_error, log_db_error};

/// Reject malformed identity or blank content before anything is written
pub(crate) fn validate(publish: &ConfigPublish) -> Result<(), QuinceError> {
    check_identity(
        &publish.key.data_id,
        &publish.key.group,
        &publish.key.tenant,
        &publish.content,
    )
}

fn new_record(publish: &ConfigPublish, op: &Operator, time: NaiveDateTime) -> config_info::Model {
    let advance = &publish.advance;
    config_info::Model {
        id: 0,
        data_id: publish.key.data_id.clone(),
        group_id: publish.key.group.clone(),
        tenant_id: publish.key.tenant.clone(),
        content: publish.content.clone(),
        md5: Some(md5_digest(&publish.content)),
        app_name: publish.app_name.clone(),
        c_desc: advance.desc.clone(),
        c_use: advance.r#use.clone(),
        effect: advance.effect.clone(),
        r#type: advance.r#type.clone(),
        c_schema: advance.schema.clone(),
        src_user: op.src_user.clone(),
        src_ip: op.src_ip.clone(),
        gmt_create: time,
        gmt_modified: time,
    }
}

fn insert_row(record: &config_info::Model) -> config_info::ActiveModel {
    config_info::ActiveModel {
        id: NotSet,
        data_id: Set(record.data_id.clone()),
        group_id: Set(record.group_id.clone()),
        tenant_id: Set(record.tenant_id.clone()),
        content: Set(record.content.clone()),
        md5: Set(record.md5.clone()),
        app_name: Set(record.app_name.clone()),
        c_desc: Set(record.c_desc.clone()),
        c_use: Set(record.c_use.clone()),
        effect: Set(record.effect.clone()),
        r#type: Set(record.r#type.clone()),
        c_schema: Set(record.c_schema.clone()),
        src_user: Set(record.src_user.clone()),
        src_ip: Set(record.src_ip.clone()),
        gmt_create: Set(record.gmt_create),
        gmt_modified: Set(record.gmt_modified),
    }
}

/// Record, tags, then an `I` history entry. Returns the new record id.
async fn insert_sequence(
    txn: &DatabaseTransaction,
    publish: &ConfigPublish,
    op: &Operator,
    time: NaiveDateTime,
) -> anyhow::Result<i64> {
    let mut record = new_record(publish, op, time);
    record.id = config::insert(txn, insert_row(&record))
        .await
        .map_err(|e| conflict_or_db_error("insert config", &publish.key, e))?;

    let tag_list = normalize_tags(publish.advance.config_tags.as_deref().unwrap_or_default());
    if !tag_list.is_empty() {
        tags::replace_tags(txn, record.id, &publish.key, &tag_list)
            .await
            .map_err(|e| log_db_error("insert config tags", e))?;
    }

    let entry =
        history::entry_from_snapshot(&record, OpType::Insert, op.src_ip(), op.src_user(), time);
    history::insert(txn, entry)
        .await
        .map_err(|e| log_db_error("insert config history", e))?;

    Ok(record.id)
}

/// Overwrite the record in place, rewrite tags when supplied, then append a
/// `U` history entry holding the replaced state.
async fn update_sequence(
    txn: &DatabaseTransaction,
    old: config_info::Model,
    publish: &ConfigPublish,
    op: &Operator,
    time: NaiveDateTime,
) -> anyhow::Result<()> {
    let advance = &publish.advance;
    let mut active = old.clone().into_active_model();
    active.content = Set(publish.content.clone());
    active.md5 = Set(Some(md5_digest(&publish.content)));
    if publish.app_name.is_some() {
        active.app_name = Set(publish.app_name.clone());
    }
    active.c_desc = Set(advance.desc.clone());
    active.c_use = Set(advance.r#use.clone());
    active.effect = Set(advance.effect.clone());
    active.r#type = Set(advance.r#type.clone());
    active.c_schema = Set(advance.schema.clone());
    active.src_user = Set(op.src_user.clone());
    active.src_ip = Set(op.src_ip.clone());
    active.gmt_modified = Set(time);

    config::update(txn, active)
        .await
        .map_err(|e| log_db_error("update config", e))?;

    if let Some(config_tags) = &advance.config_tags {
        tags::replace_tags(txn, old.id, &publish.key, &normalize_tags(config_tags))
            .await
            .map_err(|e| log_db_error("update config tags", e))?;
    }

    let entry =
        history::entry_from_snapshot(&old, OpType::Update, op.src_ip(), op.src_user(), time);
    history::insert(txn, entry)
        .await
        .map_err(|e| log_db_error("insert config history", e))?;

    Ok(())
}

async fn delete_sequence(
    txn: &DatabaseTransaction,
    old: &config_info::Model,
    op: &Operator,
    time: NaiveDateTime,
) -> anyhow::Result<()> {
    config::delete_by_id(txn, old.id)
        .await
        .map_err(|e| log_db_error("delete config", e))?;
    tags::delete_tags(txn, old.id)
        .await
        .map_err(|e| log_db_error("delete config tags", e))?;

    let entry = history::entry_from_snapshot(old, OpType::Delete, op.src_ip(), op.src_user(), time);
    history::insert(txn, entry)
        .await
        .map_err(|e| log_db_error("insert config history", e))?;

    Ok(())
}

const GROUP_KEY_MD5_PAGE_SIZE: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct ConfigPersistService {
    pub(crate) db: DatabaseConnection,
}

impl ConfigPersistService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn begin(&self) -> anyhow::Result<DatabaseTransaction> {
        Ok(self
            .db
            .begin()
            .await
            .map_err(|e| log_db_error("begin transaction", e))?)
    }

    async fn commit(txn: DatabaseTransaction) -> anyhow::Result<()> {
        Ok(txn
            .commit()
            .await
            .map_err(|e| log_db_error("commit transaction", e))?)
    }

    // ========================================================================
    // Write sequences
    // ========================================================================

    /// Insert the config if its identity is new, otherwise update it in place.
    /// Returns `true` when a new record was created.
    pub async fn insert_or_update(
        &self,
        publish: &ConfigPublish,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        validate(publish)?;

        let txn = self.begin().await?;
        let existing = config::find_by_key(&txn, &publish.key)
            .await
            .map_err(|e| log_db_error("find config", e))?;
        let created = match existing {
            Some(old) => {
                update_sequence(&txn, old, publish, op, time).await?;
                false
            }
            None => {
                insert_sequence(&txn, publish, op, time).await?;
                true
            }
        };
        Self::commit(txn).await?;

        tracing::debug!(
            data_id = %publish.key.data_id,
            group = %publish.key.group,
            tenant = %publish.key.tenant,
            created,
            "config persisted"
        );
        Ok(created)
    }

    /// Insert a new config. An existing identity fails with `ConfigConflict`.
    pub async fn add_config_info(
        &self,
        publish: &ConfigPublish,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<i64> {
        validate(publish)?;

        let txn = self.begin().await?;
        let id = insert_sequence(&txn, publish, op, time).await?;
        Self::commit(txn).await?;
        Ok(id)
    }

    /// Update an existing config. A missing identity fails with `ResourceNotFound`.
    pub async fn update_config_info(
        &self,
        publish: &ConfigPublish,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<()> {
        validate(publish)?;

        let txn = self.begin().await?;
        let old = config::find_by_key(&txn, &publish.key)
            .await
            .map_err(|e| log_db_error("find config", e))?
            .ok_or_else(|| QuinceError::ResourceNotFound(format!("config {}", publish.key)))?;
        update_sequence(&txn, old, publish, op, time).await?;
        Self::commit(txn).await
    }

    /// Delete a config with its tags. Returns the removed record, or `None`
    /// when the identity did not exist.
    pub async fn remove_config_info(
        &self,
        key: &ConfigKey,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<Option<ConfigInfo>> {
        let txn = self.begin().await?;
        let Some(old) = config::find_by_key(&txn, key)
            .await
            .map_err(|e| log_db_error("find config", e))?
        else {
            return Ok(None);
        };
        delete_sequence(&txn, &old, op, time).await?;
        Self::commit(txn).await?;

        tracing::debug!(data_id = %key.data_id, group = %key.group, tenant = %key.tenant, "config removed");
        Ok(Some(old.into()))
    }

    /// Delete every config among `ids` in one transaction. Unknown ids are ignored.
    pub async fn remove_config_info_by_ids(
        &self,
        ids: &[i64],
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<Vec<ConfigInfo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.begin().await?;
        let records = config::find_by_ids(&txn, ids)
            .await
            .map_err(|e| log_db_error("find configs by ids", e))?;
        for record in &records {
            delete_sequence(&txn, record, op, time).await?;
        }
        Self::commit(txn).await?;

        Ok(records.into_iter().map(ConfigInfo::from).collect())
    }

    // ========================================================================
    // Beta and tag variants
    // ========================================================================

    /// Returns `true` when a new beta row was created
    pub async fn insert_or_update_beta(
        &self,
        publish: &ConfigPublish,
        beta_ips: &str,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        validate(publish)?;
        let md5 = md5_digest(&publish.content);

        let existing = variant::find_beta(&self.db, &publish.key)
            .await
            .map_err(|e| log_db_error("find beta config", e))?;
        match existing {
            Some(row) => {
                let mut active = row.into_active_model();
                active.content = Set(publish.content.clone());
                active.md5 = Set(Some(md5));
                active.beta_ips = Set(Some(beta_ips.to_string()));
                if publish.app_name.is_some() {
                    active.app_name = Set(publish.app_name.clone());
                }
                active.src_user = Set(op.src_user.clone());
                active.src_ip = Set(op.src_ip.clone());
                active.gmt_modified = Set(time);
                variant::update_beta(&self.db, active)
                    .await
                    .map_err(|e| log_db_error("update beta config", e))?;
                Ok(false)
            }
            None => {
                let row = config_info_beta::ActiveModel {
                    data_id: Set(publish.key.data_id.clone()),
                    group_id: Set(publish.key.group.clone()),
                    tenant_id: Set(publish.key.tenant.clone()),
                    app_name: Set(publish.app_name.clone()),
                    content: Set(publish.content.clone()),
                    beta_ips: Set(Some(beta_ips.to_string())),
                    md5: Set(Some(md5)),
                    src_user: Set(op.src_user.clone()),
                    src_ip: Set(op.src_ip.clone()),
                    gmt_create: Set(time),
                    gmt_modified: Set(time),
                    ..Default::default()
                };
                variant::insert_beta(&self.db, row)
                    .await
                    .map_err(|e| conflict_or_db_error("insert beta config", &publish.key, e))?;
                Ok(true)
            }
        }
    }

    /// Returns `true` when a new tag row was created
    pub async fn insert_or_update_tag(
        &self,
        publish: &ConfigPublish,
        tag: &str,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        validate(publish)?;
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(QuinceError::IllegalArgument("tag is blank".to_string()).into());
        }
        let md5 = md5_digest(&publish.content);

        let existing = variant::find_tag(&self.db, &publish.key, tag)
            .await
            .map_err(|e| log_db_error("find tag config", e))?;
        match existing {
            Some(row) => {
                let mut active = row.into_active_model();
                active.content = Set(publish.content.clone());
                active.md5 = Set(Some(md5));
                if publish.app_name.is_some() {
                    active.app_name = Set(publish.app_name.clone());
                }
                active.src_user = Set(op.src_user.clone());
                active.src_ip = Set(op.src_ip.clone());
                active.gmt_modified = Set(time);
                variant::update_tag(&self.db, active)
                    .await
                    .map_err(|e| log_db_error("update tag config", e))?;
                Ok(false)
            }
            None => {
                let row = config_info_tag::ActiveModel {
                    data_id: Set(publish.key.data_id.clone()),
                    group_id: Set(publish.key.group.clone()),
                    tenant_id: Set(publish.key.tenant.clone()),
                    tag_id: Set(tag.to_string()),
                    app_name: Set(publish.app_name.clone()),
                    content: Set(publish.content.clone()),
                    md5: Set(Some(md5)),
                    src_user: Set(op.src_user.clone()),
                    src_ip: Set(op.src_ip.clone()),
                    gmt_create: Set(time),
                    gmt_modified: Set(time),
                    ..Default::default()
                };
                variant::insert_tag(&self.db, row)
                    .await
                    .map_err(|e| conflict_or_db_error("insert tag config", &publish.key, e))?;
                Ok(true)
            }
        }
    }

    pub async fn remove_config_info_beta(&self, key: &ConfigKey) -> anyhow::Result<bool> {
        let rows = variant::delete_beta(&self.db, key)
            .await
            .map_err(|e| log_db_error("delete beta config", e))?;
        Ok(rows > 0)
    }

    pub async fn remove_config_info_tag(&self, key: &ConfigKey, tag: &str) -> anyhow::Result<bool> {
        let rows = variant::delete_tag(&self.db, key, tag)
            .await
            .map_err(|e| log_db_error("delete tag config", e))?;
        Ok(rows > 0)
    }

    // ========================================================================
    // Point reads
    // ========================================================================

    pub async fn find_config_info(&self, key: &ConfigKey) -> anyhow::Result<Option<ConfigInfo>> {
        let record = config::find_by_key(&self.db, key)
            .await
            .map_err(|e| log_db_error("find config", e))?;
        Ok(record.map(ConfigInfo::from))
    }

    /// Content and digest of `data_id`/`group` in the default tenant
    pub async fn find_config_info_base(
        &self,
        data_id: &str,
        group: &str,
    ) -> anyhow::Result<Option<ConfigInfoBase>> {
        let record = config::find_by_key(&self.db, &ConfigKey::new(data_id, group, ""))
            .await
            .map_err(|e| log_db_error("find config", e))?;
        Ok(record.map(|r| ConfigInfo::from(r).config_info_base))
    }

    pub async fn find_config_info_by_id(&self, id: i64) -> anyhow::Result<Option<ConfigInfo>> {
        let record = config::find_by_id(&self.db, id)
            .await
            .map_err(|e| log_db_error("find config by id", e))?;
        Ok(record.map(ConfigInfo::from))
    }

    /// Full record with its tags joined by `,`
    pub async fn find_config_all_info(
        &self,
        key: &ConfigKey,
    ) -> anyhow::Result<Option<ConfigAllInfo>> {
        let Some(record) = config::find_by_key(&self.db, key)
            .await
            .map_err(|e| log_db_error("find config", e))?
        else {
            return Ok(None);
        };
        let tag_names = tags::find_tag_names(&self.db, record.id)
            .await
            .map_err(|e| log_db_error("find config tags", e))?;
        Ok(Some(ConfigAllInfo::from_model(record, &tag_names)))
    }

    pub async fn find_config_advance_info(
        &self,
        key: &ConfigKey,
    ) -> anyhow::Result<Option<ConfigAdvanceInfo>> {
        let Some(record) = config::find_by_key(&self.db, key)
            .await
            .map_err(|e| log_db_error("find config", e))?
        else {
            return Ok(None);
        };
        let tag_names = tags::find_tag_names(&self.db, record.id)
            .await
            .map_err(|e| log_db_error("find config tags", e))?;
        Ok(Some(ConfigAdvanceInfo::from_model(&record, &tag_names)))
    }

    /// Beta variant of `key`. Fails with `ResourceNotFound` when absent.
    pub async fn find_config_info_beta(&self, key: &ConfigKey) -> anyhow::Result<ConfigInfoBeta> {
        variant::find_beta(&self.db, key)
            .await
            .map_err(|e| log_db_error("find beta config", e))?
            .map(ConfigInfoBeta::from)
            .ok_or_else(|| QuinceError::ResourceNotFound(format!("beta config {}", key)).into())
    }

    /// Tag variant of `key`. Fails with `ResourceNotFound` when absent.
    pub async fn find_config_info_tag(
        &self,
        key: &ConfigKey,
        tag: &str,
    ) -> anyhow::Result<ConfigInfoTag> {
        variant::find_tag(&self.db, key, tag)
            .await
            .map_err(|e| log_db_error("find tag config", e))?
            .map(ConfigInfoTag::from)
            .ok_or_else(|| {
                QuinceError::ResourceNotFound(format!("tag config {} tag={}", key, tag)).into()
            })
    }

    // ========================================================================
    // Listings and scans
    // ========================================================================

    /// Exact-match listing, newest created first. Blank filters are ignored.
    pub async fn find_config_info_page(
        &self,
        page_no: u64,
        page_size: u64,
        filter: &ConfigFilter,
    ) -> anyhow::Result<Page<ConfigInfo>> {
        let page = config::find_page(&self.db, &filter.clone().fuzzy(false), page_no, page_size)
            .await
            .map_err(|e| log_db_error("find config page", e))?;
        Ok(page.map(ConfigInfo::from))
    }

    /// Listing where `*` in a filter value matches any run of characters
    pub async fn find_config_info_like_page(
        &self,
        page_no: u64,
        page_size: u64,
        filter: &ConfigFilter,
    ) -> anyhow::Result<Page<ConfigInfo>> {
        let page = config::find_page(&self.db, &filter.clone().fuzzy(true), page_no, page_size)
            .await
            .map_err(|e| log_db_error("find config like page", e))?;
        Ok(page.map(ConfigInfo::from))
    }

    /// Up to `page_size` records with id greater than `last_id`, in id order.
    /// Stable under concurrent inserts since it never uses an offset.
    pub async fn find_all_config_info_fragment(
        &self,
        last_id: i64,
        page_size: u64,
    ) -> anyhow::Result<Vec<ConfigInfo>> {
        let records = config::find_after(&self.db, last_id, page_size)
            .await
            .map_err(|e| log_db_error("find config fragment", e))?;
        Ok(records.into_iter().map(ConfigInfo::from).collect())
    }

    /// Identity and md5 of every config, read in id-ordered pages so content
    /// is never loaded
    pub async fn list_all_group_key_md5(&self) -> anyhow::Result<Vec<ConfigKeyMd5>> {
        let mut all = Vec::new();
        let mut last_id = 0;
        loop {
            let rows = config::find_key_md5_after(&self.db, last_id, GROUP_KEY_MD5_PAGE_SIZE)
                .await
                .map_err(|e| log_db_error("list config md5", e))?;
            let Some(last) = rows.last() else {
                break;
            };
            last_id = last.0;
            let full_page = rows.len() as u64 == GROUP_KEY_MD5_PAGE_SIZE;
            all.extend(rows.into_iter().map(|(_, data_id, group, tenant, md5)| ConfigKeyMd5 {
                data_id,
                group,
                tenant,
                md5: md5.unwrap_or_default(),
            }));
            if !full_page {
                break;
            }
        }
        Ok(all)
    }

    pub async fn find_configs_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<ConfigInfo>> {
        let records = config::find_by_ids(&self.db, ids)
            .await
            .map_err(|e| log_db_error("find configs by ids", e))?;
        Ok(records.into_iter().map(ConfigInfo::from).collect())
    }

    /// Records for export with tags merged. Non-empty `ids` take precedence
    /// over `filter`.
    pub async fn find_all_config_info_for_export(
        &self,
        filter: &ConfigFilter,
        ids: &[i64],
    ) -> anyhow::Result<Vec<ConfigAllInfo>> {
        let records = if ids.is_empty() {
            config::find_all(&self.db, filter).await
        } else {
            config::find_by_ids(&self.db, ids).await
        }
        .map_err(|e| log_db_error("find configs for export", e))?;

        let record_ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let tag_map = tags::find_tag_names_by_ids(&self.db, &record_ids)
            .await
            .map_err(|e| log_db_error("find config tags", e))?;

        Ok(records
            .into_iter()
            .map(|record| {
                let tag_names = tag_map.get(&record.id).map(Vec::as_slice).unwrap_or_default();
                ConfigAllInfo::from_model(record, tag_names)
            })
            .collect())
    }

    pub async fn find_all_config_info_beta(
        &self,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ConfigInfoBeta>> {
        let page = variant::find_beta_page(&self.db, page_no, page_size)
            .await
            .map_err(|e| log_db_error("find beta config page", e))?;
        Ok(page.map(ConfigInfoBeta::from))
    }

    pub async fn find_all_config_info_tag(
        &self,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ConfigInfoTag>> {
        let page = variant::find_tag_page(&self.db, page_no, page_size)
            .await
            .map_err(|e| log_db_error("find tag config page", e))?;
        Ok(page.map(ConfigInfoTag::from))
    }

    // ========================================================================
    // Counters and scope enumeration
    // ========================================================================

    pub async fn config_info_count(&self) -> anyhow::Result<u64> {
        Ok(config::count(&self.db)
            .await
            .map_err(|e| log_db_error("count configs", e))?)
    }

    pub async fn config_info_count_by_tenant(&self, tenant: &str) -> anyhow::Result<u64> {
        Ok(config::count_by_tenant(&self.db, tenant)
            .await
            .map_err(|e| log_db_error("count configs by tenant", e))?)
    }

    pub async fn config_info_beta_count(&self) -> anyhow::Result<u64> {
        Ok(variant::count_beta(&self.db)
            .await
            .map_err(|e| log_db_error("count beta configs", e))?)
    }

    pub async fn config_info_tag_count(&self) -> anyhow::Result<u64> {
        Ok(variant::count_tag(&self.db)
            .await
            .map_err(|e| log_db_error("count tag configs", e))?)
    }

    /// Largest record id, 0 when the table is empty
    pub async fn find_config_max_id(&self) -> anyhow::Result<i64> {
        Ok(config::max_id(&self.db)
            .await
            .map_err(|e| log_db_error("find max config id", e))?)
    }

    /// Distinct groups of the default tenant
    pub async fn get_group_id_list(&self, page_no: u64, page_size: u64) -> anyhow::Result<Vec<String>> {
        Ok(config::find_group_ids(&self.db, page_no, page_size)
            .await
            .map_err(|e| log_db_error("find group ids", e))?)
    }

    /// Distinct non-default tenants
    pub async fn get_tenant_id_list(&self, page_no: u64, page_size: u64) -> anyhow::Result<Vec<String>> {
        Ok(config::find_tenant_ids(&self.db, page_no, page_size)
            .await
            .map_err(|e| log_db_error("find tenant ids", e))?)
    }
}
