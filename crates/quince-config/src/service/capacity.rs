//! Capacity accounting service
//!
//! Tracks per-scope config counts against quotas. Usage changes are single
//! conditional updates at the storage layer and are not part of any config
//! write transaction; `correct_usage` recomputes usage from the config table
//! to repair drift.

use std::time::Instant;

use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use quince_persistence::model::{CapacityLimits, CapacityRecord, CapacityScope};
use quince_persistence::sql::capacity::{self, UsageGuard};
use quince_persistence::sql::{config, is_unique_violation};

use crate::model::{CapacityCheckResult, CapacitySettings, CounterMode};
use crate::service::log_db_error;

/// Capacity rows fetched per page by the usage correction sweep
pub const CORRECT_USAGE_PAGE_SIZE: u64 = 100;

/// Scope ids fetched per page by `init_all_capacity`
pub const INIT_PAGE_SIZE: u64 = 500;

fn saturating_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn or_default(value: i32, default: i32) -> i32 {
    if value == 0 { default } else { value }
}

#[derive(Clone, Debug)]
pub struct CapacityService {
    db: DatabaseConnection,
    settings: CapacitySettings,
}

impl CapacityService {
    pub fn new(db: DatabaseConnection, settings: CapacitySettings) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &CapacitySettings {
        &self.settings
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Stored row as is, sentinel zeros included
    pub async fn get_capacity(&self, scope: &CapacityScope) -> anyhow::Result<Option<CapacityRecord>> {
        Ok(capacity::find(&self.db, scope)
            .await
            .map_err(|e| log_db_error("find capacity", e))?)
    }

    /// Stored row with every sentinel zero limit replaced by the system default
    pub async fn get_capacity_with_default(
        &self,
        scope: &CapacityScope,
    ) -> anyhow::Result<Option<CapacityRecord>> {
        let Some(mut record) = self.get_capacity(scope).await? else {
            return Ok(None);
        };
        let settings = &self.settings;
        record.quota = or_default(record.quota, settings.default_quota(scope));
        record.max_size = or_default(record.max_size, settings.default_max_size);
        record.max_aggr_count = or_default(record.max_aggr_count, settings.default_max_aggr_count);
        record.max_aggr_size = or_default(record.max_aggr_size, settings.default_max_aggr_size);
        Ok(Some(record))
    }

    /// Whether a write of `content_size` bytes that adds one config to
    /// `scope` fits its limits. A scope without a row is checked against
    /// the defaults with zero usage.
    pub async fn check_capacity(
        &self,
        scope: &CapacityScope,
        content_size: usize,
    ) -> anyhow::Result<CapacityCheckResult> {
        let (usage, quota, max_size) = match self.get_capacity_with_default(scope).await? {
            Some(record) => (record.usage, record.quota, record.max_size),
            None => (
                0,
                self.settings.default_quota(scope),
                self.settings.default_max_size,
            ),
        };

        if content_size > usize::try_from(max_size).unwrap_or(0) {
            return Ok(CapacityCheckResult::over_max_size(scope, content_size, max_size));
        }
        if usage >= quota {
            return Ok(CapacityCheckResult::over_quota(scope, usage, quota));
        }
        Ok(CapacityCheckResult::allowed(usage, quota))
    }

    // ========================================================================
    // Usage counters
    // ========================================================================

    /// Add one to the usage of `scope`. Unless `ignore_quota_limit` is set the
    /// increment only happens while usage is below the effective quota;
    /// `false` means the quota is reached and nothing changed.
    pub async fn increment_usage(
        &self,
        scope: &CapacityScope,
        ignore_quota_limit: bool,
    ) -> anyhow::Result<bool> {
        if ignore_quota_limit {
            return self.apply_increment(scope, UsageGuard::Unbounded).await;
        }

        // Most rows keep the default quota, try that first
        let default_quota = self.settings.default_quota(scope);
        if self
            .apply_increment(scope, UsageGuard::DefaultQuota(default_quota))
            .await?
        {
            return Ok(true);
        }
        self.apply_increment(scope, UsageGuard::ExplicitQuota).await
    }

    async fn apply_increment(&self, scope: &CapacityScope, guard: UsageGuard) -> anyhow::Result<bool> {
        Ok(capacity::increment_usage(&self.db, scope, guard)
            .await
            .map_err(|e| log_db_error("increment capacity usage", e))?)
    }

    /// Subtract one from the usage of `scope`; never goes below zero
    pub async fn decrement_usage(&self, scope: &CapacityScope) -> anyhow::Result<bool> {
        Ok(capacity::decrement_usage(&self.db, scope)
            .await
            .map_err(|e| log_db_error("decrement capacity usage", e))?)
    }

    /// Create the row of `scope` when missing, then apply `mode`
    pub async fn insert_and_update_usage(
        &self,
        scope: &CapacityScope,
        mode: CounterMode,
        ignore_quota_limit: bool,
    ) -> anyhow::Result<bool> {
        if self.get_capacity(scope).await?.is_none() {
            self.init_capacity(scope).await?;
        }
        match mode {
            CounterMode::Increment => self.increment_usage(scope, ignore_quota_limit).await,
            CounterMode::Decrement => self.decrement_usage(scope).await,
        }
    }

    /// Usage hook for one config write in `group`/`tenant`. The cluster is
    /// counted first, then the tenant (non-blank tenant) or the group. When
    /// the second step is refused the cluster change is reverted. Quotas are
    /// only enforced when `capacity_limit_check` is on.
    pub async fn update_config_usage(
        &self,
        group: &str,
        tenant: &str,
        mode: CounterMode,
        ignore_quota_limit: bool,
    ) -> anyhow::Result<bool> {
        if !self.settings.manage_capacity {
            return Ok(true);
        }
        let ignore_quota_limit = ignore_quota_limit || !self.settings.capacity_limit_check;

        let cluster = CapacityScope::Cluster;
        if !self
            .insert_and_update_usage(&cluster, mode, ignore_quota_limit)
            .await?
        {
            tracing::warn!(mode = ?mode, "cluster capacity refused usage change");
            return Ok(false);
        }

        let scope = if tenant.trim().is_empty() {
            CapacityScope::Group(group.to_string())
        } else {
            CapacityScope::Tenant(tenant.to_string())
        };
        if self
            .insert_and_update_usage(&scope, mode, ignore_quota_limit)
            .await?
        {
            return Ok(true);
        }

        tracing::warn!(scope = %scope, mode = ?mode, "capacity refused usage change, reverting cluster usage");
        match mode.reverse() {
            CounterMode::Increment => self.increment_usage(&cluster, true).await?,
            CounterMode::Decrement => self.decrement_usage(&cluster).await?,
        };
        Ok(false)
    }

    // ========================================================================
    // Row lifecycle
    // ========================================================================

    /// Insert a row whose usage is the current config count of `scope`.
    /// Losing an insert race to another node is not an error.
    async fn insert_capacity(
        &self,
        scope: &CapacityScope,
        limits: &CapacityLimits,
    ) -> anyhow::Result<bool> {
        let usage = capacity::count_configs(&self.db, scope)
            .await
            .map_err(|e| log_db_error("count configs of scope", e))?;

        match capacity::insert(&self.db, scope, limits, saturating_i32(usage)).await {
            Ok(_) => {
                tracing::debug!(scope = %scope, usage, "capacity initialized");
                Ok(true)
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(scope = %scope, "capacity already initialized: {}", err);
                Ok(false)
            }
            Err(err) => Err(log_db_error("insert capacity", err).into()),
        }
    }

    /// Create the row of `scope` with default limits, then apply auto
    /// expansion. Returns whether this call created the row.
    pub async fn init_capacity(&self, scope: &CapacityScope) -> anyhow::Result<bool> {
        let inserted = self.insert_capacity(scope, &CapacityLimits::default()).await?;
        self.auto_expansion(scope).await?;
        Ok(inserted)
    }

    /// When a group or tenant still on the default quota already holds at
    /// least that many configs, raise its quota to
    /// `usage + default_quota * initial_expansion_percent / 100`.
    /// Never applies to the cluster or to a row with an explicit quota.
    pub async fn auto_expansion(&self, scope: &CapacityScope) -> anyhow::Result<bool> {
        if matches!(scope, CapacityScope::Cluster) {
            return Ok(false);
        }
        let Some(record) = self.get_capacity(scope).await? else {
            return Ok(false);
        };
        let default_quota = self.settings.default_quota(scope);
        let percent = self.settings.initial_expansion_percent;
        if record.quota != 0 || record.usage < default_quota || percent <= 0 {
            return Ok(false);
        }

        let expanded =
            i64::from(record.usage) + i64::from(default_quota) * i64::from(percent) / 100;
        let quota = i32::try_from(expanded).unwrap_or(i32::MAX);
        let limits = CapacityLimits {
            quota: Some(quota),
            ..Default::default()
        };
        capacity::update_limits(&self.db, scope, &limits)
            .await
            .map_err(|e| log_db_error("expand capacity quota", e))?;

        tracing::warn!(
            scope = %scope,
            usage = record.usage,
            default_quota,
            quota,
            "usage already reached the default quota at initialization, quota expanded"
        );
        Ok(true)
    }

    /// Set explicit limits on `scope`, creating the row when missing. A new
    /// row without an explicit quota goes through auto expansion.
    pub async fn insert_or_update_capacity(
        &self,
        scope: &CapacityScope,
        limits: &CapacityLimits,
    ) -> anyhow::Result<bool> {
        if self.get_capacity(scope).await?.is_some() {
            return Ok(capacity::update_limits(&self.db, scope, limits)
                .await
                .map_err(|e| log_db_error("update capacity limits", e))?);
        }

        let inserted = self.insert_capacity(scope, limits).await?;
        if limits.quota.is_none() {
            self.auto_expansion(scope).await?;
        }
        Ok(inserted)
    }

    pub async fn delete_capacity(&self, scope: &CapacityScope) -> anyhow::Result<bool> {
        Ok(capacity::delete(&self.db, scope)
            .await
            .map_err(|e| log_db_error("delete capacity", e))?)
    }

    // ========================================================================
    // Maintenance sweeps
    // ========================================================================

    /// Overwrite the usage of `scope` with its real config count
    pub async fn correct_scope_usage(&self, scope: &CapacityScope) -> anyhow::Result<bool> {
        let count = capacity::count_configs(&self.db, scope)
            .await
            .map_err(|e| log_db_error("count configs of scope", e))?;
        Ok(capacity::update_usage(&self.db, scope, saturating_i32(count))
            .await
            .map_err(|e| log_db_error("correct capacity usage", e))?)
    }

    pub async fn correct_group_usage(&self, group: &str) -> anyhow::Result<bool> {
        self.correct_scope_usage(&CapacityScope::Group(group.to_string()))
            .await
    }

    pub async fn correct_tenant_usage(&self, tenant: &str) -> anyhow::Result<bool> {
        self.correct_scope_usage(&CapacityScope::Tenant(tenant.to_string()))
            .await
    }

    /// Recompute usage of every capacity row, group rows (cluster included)
    /// first, then tenant rows
    pub async fn correct_usage(&self) -> anyhow::Result<()> {
        self.correct_rows(false).await?;
        self.correct_rows(true).await
    }

    async fn correct_rows(&self, tenant: bool) -> anyhow::Result<()> {
        let mut last_id = 0;
        loop {
            let rows = if tenant {
                capacity::find_tenant_rows_after(&self.db, last_id, CORRECT_USAGE_PAGE_SIZE).await
            } else {
                capacity::find_group_rows_after(&self.db, last_id, CORRECT_USAGE_PAGE_SIZE).await
            }
            .map_err(|e| log_db_error("find capacity rows", e))?;

            let Some(last) = rows.last() else {
                break;
            };
            last_id = last.id;
            let full_page = rows.len() as u64 == CORRECT_USAGE_PAGE_SIZE;

            for row in rows {
                let scope = if tenant {
                    CapacityScope::Tenant(row.scope_id)
                } else if row.scope_id.is_empty() {
                    CapacityScope::Cluster
                } else {
                    CapacityScope::Group(row.scope_id)
                };
                self.correct_scope_usage(&scope).await?;
            }

            if !full_page {
                break;
            }
            tokio::time::sleep(self.settings.sweep_page_delay).await;
        }
        Ok(())
    }

    /// Make sure every group and tenant present in the config table has a
    /// capacity row
    pub async fn init_all_capacity(&self) -> anyhow::Result<()> {
        self.init_all(false).await?;
        self.init_all(true).await
    }

    async fn init_all(&self, tenant: bool) -> anyhow::Result<()> {
        let mut page_no = 1;
        loop {
            let ids = if tenant {
                config::find_tenant_ids(&self.db, page_no, INIT_PAGE_SIZE).await
            } else {
                config::find_group_ids(&self.db, page_no, INIT_PAGE_SIZE).await
            }
            .map_err(|e| log_db_error("find scope ids", e))?;

            let full_page = ids.len() as u64 == INIT_PAGE_SIZE;
            for id in ids {
                let scope = if tenant {
                    CapacityScope::Tenant(id)
                } else {
                    CapacityScope::Group(id)
                };
                self.init_capacity(&scope).await?;
            }

            if !full_page {
                break;
            }
            tokio::time::sleep(self.settings.sweep_page_delay).await;
            page_no += 1;
        }
        Ok(())
    }

    /// Run `correct_usage` every `correct_usage_delay` until `shutdown` fires
    pub fn spawn_usage_correction(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let service = self.clone();
        let interval = self.settings.correct_usage_delay;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        tracing::info!("capacity usage correction stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let started = Instant::now();
                        match service.correct_usage().await {
                            Ok(()) => tracing::info!(
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                "capacity usage correction finished"
                            ),
                            Err(e) => tracing::error!("capacity usage correction failed: {}", e),
                        }
                    }
                }
            }
        })
    }
}
