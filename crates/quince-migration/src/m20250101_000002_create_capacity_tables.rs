use sea_orm_migration::prelude::*;

use crate::id_col;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Both capacity tables share every column except the scope key.
fn capacity_table<T: IntoIden + Copy + 'static>(
    backend: sea_orm_migration::sea_orm::DatabaseBackend,
    table: T,
    scope_col: T,
) -> TableCreateStatement {
    let limit = |col: Capacity| {
        ColumnDef::new(col)
            .integer()
            .not_null()
            .default(0)
            .to_owned()
    };

    Table::create()
        .table(table)
        .if_not_exists()
        .col(id_col(backend, Capacity::Id))
        .col(
            ColumnDef::new(scope_col)
                .string_len(128)
                .not_null()
                .default(""),
        )
        .col(limit(Capacity::Quota))
        .col(limit(Capacity::Usage))
        .col(limit(Capacity::MaxSize))
        .col(limit(Capacity::MaxAggrCount))
        .col(limit(Capacity::MaxAggrSize))
        .col(limit(Capacity::MaxHistoryCount))
        .col(ColumnDef::new(Capacity::GmtCreate).date_time().not_null())
        .col(ColumnDef::new(Capacity::GmtModified).date_time().not_null())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(capacity_table(
                backend,
                GroupCapacity::Table,
                GroupCapacity::GroupId,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_group_id")
                    .table(GroupCapacity::Table)
                    .col(GroupCapacity::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(capacity_table(
                backend,
                TenantCapacity::Table,
                TenantCapacity::TenantId,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_tenant_id")
                    .table(TenantCapacity::Table)
                    .col(TenantCapacity::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenantCapacity::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupCapacity::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum GroupCapacity {
    Table,
    GroupId,
}

#[derive(DeriveIden, Clone, Copy)]
enum TenantCapacity {
    Table,
    TenantId,
}

#[derive(DeriveIden, Clone, Copy)]
enum Capacity {
    Id,
    Quota,
    Usage,
    MaxSize,
    MaxAggrCount,
    MaxAggrSize,
    MaxHistoryCount,
    GmtCreate,
    GmtModified,
}
