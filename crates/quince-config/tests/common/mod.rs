//! Shared test utilities
//!
//! Every test gets its own migrated in-memory SQLite database.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use quince_config::{
    CapacitySettings, CapacityService, ConfigKey, ConfigPersistService, ConfigPublish, Operator,
};
use quince_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";
pub const TEST_TENANT: &str = "test-tenant";

/// Test database wrapper
pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Fresh in-memory database. One pooled connection keeps every query on
    /// the same SQLite memory instance.
    pub async fn sqlite() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        Self::connect(opt).await
    }

    async fn connect(opt: ConnectOptions) -> Result<Self, DbErr> {
        let connection = Database::connect(opt).await?;
        Migrator::up(&connection, None).await?;
        Ok(Self { connection })
    }

    pub fn config_service(&self) -> ConfigPersistService {
        ConfigPersistService::new(self.connection.clone())
    }

    pub fn capacity_service(&self, settings: CapacitySettings) -> CapacityService {
        CapacityService::new(self.connection.clone(), settings)
    }
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique data id for a test
pub fn unique_data_id(prefix: &str) -> String {
    format!("{}-{}.yaml", prefix, COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub fn key(data_id: &str, group: &str, tenant: &str) -> ConfigKey {
    ConfigKey::new(data_id, group, tenant)
}

pub fn publish(data_id: &str, group: &str, tenant: &str, content: &str) -> ConfigPublish {
    ConfigPublish::new(key(data_id, group, tenant), content)
}

pub fn operator() -> Operator {
    Operator::new("127.0.0.1", "admin")
}

pub fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
