//! History log queries

use chrono::NaiveDateTime;

use quince_common::QuinceError;
use quince_persistence::model::{ConfigKey, Page};
use quince_persistence::sql::{config, history};

use crate::model::{ConfigChangeInfo, ConfigHistoryInfo};
use crate::service::config::ConfigPersistService;
use crate::service::log_db_error;

impl ConfigPersistService {
    /// History of one identity, newest first
    pub async fn find_config_history(
        &self,
        key: &ConfigKey,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ConfigHistoryInfo>> {
        let page = history::find_page(&self.db, key, page_no, page_size)
            .await
            .map_err(|e| log_db_error("find config history page", e))?;
        Ok(page.map(ConfigHistoryInfo::from))
    }

    /// Single history entry. Fails with `ResourceNotFound` when absent.
    pub async fn detail_config_history(&self, nid: i64) -> anyhow::Result<ConfigHistoryInfo> {
        history::find_by_nid(&self.db, nid)
            .await
            .map_err(|e| log_db_error("find config history", e))?
            .map(ConfigHistoryInfo::from)
            .ok_or_else(|| QuinceError::ResourceNotFound(format!("history entry {}", nid)).into())
    }

    /// Entry written for the same config just before `nid`. The entry `nid`
    /// must exist and belong to `key`.
    pub async fn get_previous_config_history(
        &self,
        key: &ConfigKey,
        nid: i64,
    ) -> anyhow::Result<Option<ConfigHistoryInfo>> {
        let current = history::find_by_nid(&self.db, nid)
            .await
            .map_err(|e| log_db_error("find config history", e))?
            .filter(|entry| {
                entry.data_id == key.data_id
                    && entry.group_id == key.group
                    && entry.tenant_id == key.tenant
            })
            .ok_or_else(|| {
                QuinceError::ResourceNotFound(format!("history entry {} of {}", nid, key))
            })?;

        let previous = history::find_previous(&self.db, current.id, nid)
            .await
            .map_err(|e| log_db_error("find previous config history", e))?;
        Ok(previous.map(ConfigHistoryInfo::from))
    }

    /// Configs modified inside `[start, end]`
    pub async fn find_changed_config(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<ConfigChangeInfo>> {
        let records = config::find_modified_between(&self.db, start, end)
            .await
            .map_err(|e| log_db_error("find changed configs", e))?;
        Ok(records.into_iter().map(ConfigChangeInfo::from).collect())
    }

    /// Configs deleted inside `[start, end]`, from the history log
    pub async fn find_deleted_config(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<ConfigChangeInfo>> {
        let entries = history::find_deleted_between(&self.db, start, end)
            .await
            .map_err(|e| log_db_error("find deleted configs", e))?;
        Ok(entries.into_iter().map(ConfigChangeInfo::from).collect())
    }

    /// Purge at most `limit` entries modified before `before`
    pub async fn remove_config_history(
        &self,
        before: NaiveDateTime,
        limit: u64,
    ) -> anyhow::Result<u64> {
        let removed = history::delete_before(&self.db, before, limit)
            .await
            .map_err(|e| log_db_error("purge config history", e))?;
        if removed > 0 {
            tracing::info!(removed, %before, "purged config history");
        }
        Ok(removed)
    }

    pub async fn find_config_history_count_by_time(
        &self,
        before: NaiveDateTime,
    ) -> anyhow::Result<u64> {
        Ok(history::count_before(&self.db, before)
            .await
            .map_err(|e| log_db_error("count config history", e))?)
    }
}
