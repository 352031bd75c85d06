//! Capacity accounting models

use std::time::Duration;

use serde::{Deserialize, Serialize};

use quince_common::ErrorCode;
use quince_common::error::{OVER_CLUSTER_QUOTA, OVER_GROUP_QUOTA, OVER_MAX_SIZE, OVER_TENANT_QUOTA};
use quince_persistence::model::CapacityScope;

/// Direction of a usage change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterMode {
    Increment,
    Decrement,
}

impl CounterMode {
    pub fn reverse(self) -> Self {
        match self {
            CounterMode::Increment => CounterMode::Decrement,
            CounterMode::Decrement => CounterMode::Increment,
        }
    }
}

/// System defaults and switches consumed by the capacity service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacitySettings {
    /// Whether usage is counted at all
    pub manage_capacity: bool,
    /// Whether writes are rejected once a quota is reached
    pub capacity_limit_check: bool,
    pub default_cluster_quota: i32,
    pub default_group_quota: i32,
    pub default_tenant_quota: i32,
    pub default_max_size: i32,
    pub default_max_aggr_count: i32,
    pub default_max_aggr_size: i32,
    /// Percent of the default quota granted on top of an over-quota usage
    /// discovered during lazy initialization. 0 disables expansion.
    pub initial_expansion_percent: i32,
    pub correct_usage_delay: Duration,
    pub sweep_page_delay: Duration,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            manage_capacity: true,
            capacity_limit_check: false,
            default_cluster_quota: 100_000,
            default_group_quota: 200,
            default_tenant_quota: 200,
            default_max_size: 100 * 1024,
            default_max_aggr_count: 10_000,
            default_max_aggr_size: 1024,
            initial_expansion_percent: 100,
            correct_usage_delay: Duration::from_secs(600),
            sweep_page_delay: Duration::from_millis(100),
        }
    }
}

impl CapacitySettings {
    /// Default quota substituted for a stored sentinel zero
    pub fn default_quota(&self, scope: &CapacityScope) -> i32 {
        match scope {
            CapacityScope::Cluster => self.default_cluster_quota,
            CapacityScope::Group(_) => self.default_group_quota,
            CapacityScope::Tenant(_) => self.default_tenant_quota,
        }
    }
}

/// Capacity check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityCheckResult {
    /// Whether the operation is allowed
    pub allowed: bool,
    /// Error code if not allowed
    pub code: Option<ErrorCode<'static>>,
    /// Error message if not allowed
    pub message: Option<String>,
    /// Current usage
    pub usage: i32,
    /// Quota limit
    pub quota: i32,
}

impl CapacityCheckResult {
    pub fn allowed(usage: i32, quota: i32) -> Self {
        Self {
            allowed: true,
            code: None,
            message: None,
            usage,
            quota,
        }
    }

    pub fn denied(
        code: ErrorCode<'static>,
        message: impl Into<String>,
        usage: i32,
        quota: i32,
    ) -> Self {
        Self {
            allowed: false,
            code: Some(code),
            message: Some(message.into()),
            usage,
            quota,
        }
    }

    pub fn over_quota(scope: &CapacityScope, usage: i32, quota: i32) -> Self {
        let code = match scope {
            CapacityScope::Cluster => OVER_CLUSTER_QUOTA,
            CapacityScope::Group(_) => OVER_GROUP_QUOTA,
            CapacityScope::Tenant(_) => OVER_TENANT_QUOTA,
        };
        Self::denied(
            code,
            format!("{} usage {} reached quota {}", scope, usage, quota),
            usage,
            quota,
        )
    }

    pub fn over_max_size(scope: &CapacityScope, size: usize, max_size: i32) -> Self {
        Self::denied(
            OVER_MAX_SIZE,
            format!("content size {} exceeds {} limit {}", size, scope, max_size),
            0,
            0,
        )
    }
}
