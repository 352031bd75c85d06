//! Optional-filter builder for config listings
//!
//! Blank values are ignored. In fuzzy mode a `*` in a value matches any run of
//! characters; other LIKE metacharacters are matched literally.

use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, Condition};

use crate::entity::config_info;

/// Escape SQL wildcard characters and convert user wildcards to SQL LIKE pattern.
#[inline]
pub fn escape_sql_like_pattern(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace('*', "%")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFilter {
    pub data_id: Option<String>,
    pub group: Option<String>,
    pub tenant: Option<String>,
    pub app_name: Option<String>,
    pub fuzzy: bool,
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl ConfigFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_id(mut self, data_id: impl Into<String>) -> Self {
        self.data_id = non_blank(data_id);
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = non_blank(group);
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = non_blank(tenant);
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = non_blank(app_name);
        self
    }

    /// Match values as `*` patterns instead of exact values
    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    fn clause(&self, column: config_info::Column, value: &str) -> sea_orm::sea_query::SimpleExpr {
        if self.fuzzy {
            column.like(LikeExpr::new(escape_sql_like_pattern(value)).escape('\\'))
        } else {
            column.eq(value)
        }
    }

    /// Translate into a `config_info` filter condition
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(data_id) = &self.data_id {
            condition = condition.add(self.clause(config_info::Column::DataId, data_id));
        }
        if let Some(group) = &self.group {
            condition = condition.add(self.clause(config_info::Column::GroupId, group));
        }
        if let Some(tenant) = &self.tenant {
            condition = condition.add(self.clause(config_info::Column::TenantId, tenant));
        }
        if let Some(app_name) = &self.app_name {
            condition = condition.add(self.clause(config_info::Column::AppName, app_name));
        }
        condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn test_escape_sql_like_pattern() {
        assert_eq!(escape_sql_like_pattern("app*"), "app%");
        assert_eq!(escape_sql_like_pattern("my_app"), "my\\_app");
        assert_eq!(escape_sql_like_pattern("100%"), "100\\%");
    }

    #[test]
    fn test_blank_values_ignored() {
        let filter = ConfigFilter::new().data_id("  ").group("").app_name("app");
        assert_eq!(filter.data_id, None);
        assert_eq!(filter.group, None);
        assert_eq!(filter.app_name.as_deref(), Some("app"));
    }

    #[test]
    fn test_condition_sql() {
        let sql = config_info::Entity::find()
            .filter(ConfigFilter::new().data_id("a.yaml").group("G").condition())
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#""config_info"."data_id" = 'a.yaml'"#));
        assert!(sql.contains(r#""config_info"."group_id" = 'G'"#));
        assert!(!sql.contains("tenant_id\" ="));

        let sql = config_info::Entity::find()
            .filter(ConfigFilter::new().data_id("app*").fuzzy(true).condition())
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("LIKE 'app%'"));
    }
}
