//! Namespace metadata
//!
//! Namespaces are rows of `tenant_info` keyed by `(kp, tenant_id)`. They only
//! describe a tenant; configs of a tenant live on whether or not it is
//! registered here.

use quince_common::{QuinceError, TENANT_MAX_LEN, is_valid};
use quince_persistence::sql::{is_unique_violation, tenant};

use crate::model::TenantInfo;
use crate::service::config::ConfigPersistService;
use crate::service::log_db_error;

fn check_tenant_id(tenant_id: &str) -> Result<(), QuinceError> {
    if tenant_id.trim().is_empty() {
        return Err(QuinceError::IllegalArgument("tenantId is blank".to_string()));
    }
    if tenant_id.len() > TENANT_MAX_LEN || !is_valid(tenant_id) {
        return Err(QuinceError::IllegalArgument(format!(
            "invalid tenantId: {}",
            tenant_id
        )));
    }
    Ok(())
}

impl ConfigPersistService {
    /// Register a namespace. Fails with `NamespaceConflict` when `tenant_id`
    /// already exists under `kp`.
    pub async fn insert_tenant_info_atomic(
        &self,
        kp: &str,
        tenant_id: &str,
        tenant_name: &str,
        tenant_desc: Option<&str>,
        create_source: Option<&str>,
        time_millis: i64,
    ) -> anyhow::Result<()> {
        check_tenant_id(tenant_id)?;

        tenant::insert(
            &self.db,
            kp,
            tenant_id,
            tenant_name,
            tenant_desc,
            create_source,
            time_millis,
        )
        .await
        .map_err(|e| -> anyhow::Error {
            if is_unique_violation(&e) {
                QuinceError::NamespaceConflict(tenant_id.to_string()).into()
            } else {
                log_db_error("insert tenant info", e).into()
            }
        })?;

        tracing::info!(kp, tenant_id, "namespace created");
        Ok(())
    }

    /// Change the display name and description. `false` when the namespace
    /// does not exist.
    pub async fn update_tenant_name_atomic(
        &self,
        kp: &str,
        tenant_id: &str,
        tenant_name: &str,
        tenant_desc: Option<&str>,
        time_millis: i64,
    ) -> anyhow::Result<bool> {
        Ok(
            tenant::update_name(&self.db, kp, tenant_id, tenant_name, tenant_desc, time_millis)
                .await
                .map_err(|e| log_db_error("update tenant info", e))?,
        )
    }

    /// Every namespace registered under `kp`, oldest first
    pub async fn find_tenant_by_kp(&self, kp: &str) -> anyhow::Result<Vec<TenantInfo>> {
        let rows = tenant::find_by_kp(&self.db, kp)
            .await
            .map_err(|e| log_db_error("find tenant infos", e))?;
        Ok(rows.into_iter().map(TenantInfo::from).collect())
    }

    pub async fn find_tenant_by_kp_and_tenant_id(
        &self,
        kp: &str,
        tenant_id: &str,
    ) -> anyhow::Result<Option<TenantInfo>> {
        let row = tenant::find_by_kp_and_tenant_id(&self.db, kp, tenant_id)
            .await
            .map_err(|e| log_db_error("find tenant info", e))?;
        Ok(row.map(TenantInfo::from))
    }

    /// Remove a namespace. Configs stored under the tenant are kept.
    pub async fn remove_tenant_info_atomic(&self, kp: &str, tenant_id: &str) -> anyhow::Result<bool> {
        let rows = tenant::delete(&self.db, kp, tenant_id)
            .await
            .map_err(|e| log_db_error("delete tenant info", e))?;
        if rows > 0 {
            tracing::info!(kp, tenant_id, "namespace removed");
        }
        Ok(rows > 0)
    }

    /// Number of namespace rows using `tenant_id` under any `kp`
    pub async fn tenant_info_count_by_tenant_id(&self, tenant_id: &str) -> anyhow::Result<u64> {
        check_tenant_id(tenant_id)?;
        Ok(tenant::count_by_tenant_id(&self.db, tenant_id)
            .await
            .map_err(|e| log_db_error("count tenant infos", e))?)
    }
}
