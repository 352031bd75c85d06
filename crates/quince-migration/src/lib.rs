//! Schema migrations for the Quince storage tables

pub use sea_orm_migration::prelude::*;

use sea_orm_migration::sea_orm::DatabaseBackend;

mod m20250101_000001_create_config_tables;
mod m20250101_000002_create_capacity_tables;
mod m20250101_000003_create_tenant_info_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_config_tables::Migration),
            Box::new(m20250101_000002_create_capacity_tables::Migration),
            Box::new(m20250101_000003_create_tenant_info_table::Migration),
        ]
    }
}

/// Auto-increment primary key column.
///
/// SQLite only accepts AUTOINCREMENT on an `integer` column, which is 64-bit there.
pub(crate) fn id_col<T: IntoIden>(backend: DatabaseBackend, col: T) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    match backend {
        DatabaseBackend::Sqlite => def.integer(),
        _ => def.big_integer(),
    };
    def.not_null().auto_increment().primary_key().to_owned()
}
