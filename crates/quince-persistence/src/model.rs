//! Domain model types for persistence operations

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use quince_common::CLUSTER;

/// Generic paginated result
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                total_count.div_ceil(page_size)
            } else {
                0
            },
            page_items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_count: self.total_count,
            page_number: self.page_number,
            pages_available: self.pages_available,
            page_items: self.page_items.into_iter().map(f).collect(),
        }
    }
}

/// Offset of the first row of a 1-based page
pub fn page_offset(page_no: u64, page_size: u64) -> u64 {
    page_no.saturating_sub(1) * page_size
}

/// Config identity: (dataId, group, tenant)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigKey {
    pub data_id: String,
    pub group: String,
    /// Empty string is the default namespace
    pub tenant: String,
}

impl ConfigKey {
    pub fn new(data_id: impl Into<String>, group: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            group: group.into(),
            tenant: tenant.into(),
        }
    }
}

impl Display for ConfigKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}+{}", self.data_id, self.group, self.tenant)
    }
}

/// History operation type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpType {
    Insert,
    Update,
    Delete,
}

impl OpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Insert => "I",
            OpType::Update => "U",
            OpType::Delete => "D",
        }
    }
}

impl std::str::FromStr for OpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "I" => Ok(OpType::Insert),
            "U" => Ok(OpType::Update),
            "D" => Ok(OpType::Delete),
            other => Err(format!("unknown op type: {}", other)),
        }
    }
}

impl Display for OpType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scope a capacity row is tracked against
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CapacityScope {
    Cluster,
    Group(String),
    Tenant(String),
}

impl CapacityScope {
    /// Key stored in the scope column. The cluster lives in `group_capacity`
    /// under the empty group id.
    pub fn scope_id(&self) -> &str {
        match self {
            CapacityScope::Cluster => CLUSTER,
            CapacityScope::Group(group) => group,
            CapacityScope::Tenant(tenant) => tenant,
        }
    }

    pub fn is_tenant(&self) -> bool {
        matches!(self, CapacityScope::Tenant(_))
    }
}

impl Display for CapacityScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityScope::Cluster => write!(f, "cluster"),
            CapacityScope::Group(group) => write!(f, "group:{}", group),
            CapacityScope::Tenant(tenant) => write!(f, "tenant:{}", tenant),
        }
    }
}

/// A group, tenant or cluster capacity row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRecord {
    pub id: i64,
    /// Group id or tenant id, empty for the cluster row
    pub scope_id: String,
    pub quota: i32,
    pub usage: i32,
    pub max_size: i32,
    pub max_aggr_count: i32,
    pub max_aggr_size: i32,
    pub max_history_count: i32,
    pub gmt_create: chrono::NaiveDateTime,
    pub gmt_modified: chrono::NaiveDateTime,
}

/// Explicit limits for a capacity row; `None` leaves the stored value alone
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapacityLimits {
    pub quota: Option<i32>,
    pub max_size: Option<i32>,
    pub max_aggr_count: Option<i32>,
    pub max_aggr_size: Option<i32>,
    pub max_history_count: Option<i32>,
}

impl CapacityLimits {
    pub fn is_empty(&self) -> bool {
        self.quota.is_none()
            && self.max_size.is_none()
            && self.max_aggr_count.is_none()
            && self.max_aggr_size.is_none()
            && self.max_history_count.is_none()
    }
}
