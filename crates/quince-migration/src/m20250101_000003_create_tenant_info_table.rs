use sea_orm_migration::prelude::*;

use crate::id_col;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(TenantInfo::Table)
                    .if_not_exists()
                    .col(id_col(backend, TenantInfo::Id))
                    .col(ColumnDef::new(TenantInfo::Kp).string_len(128).not_null())
                    .col(
                        ColumnDef::new(TenantInfo::TenantId)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TenantInfo::TenantName)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(TenantInfo::TenantDesc).string_len(256))
                    .col(ColumnDef::new(TenantInfo::CreateSource).string_len(32))
                    .col(ColumnDef::new(TenantInfo::GmtCreate).big_integer().not_null())
                    .col(ColumnDef::new(TenantInfo::GmtModified).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_tenant_info_kptenantid")
                    .table(TenantInfo::Table)
                    .col(TenantInfo::Kp)
                    .col(TenantInfo::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_id")
                    .table(TenantInfo::Table)
                    .col(TenantInfo::TenantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenantInfo::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantInfo {
    Table,
    Id,
    Kp,
    TenantId,
    TenantName,
    TenantDesc,
    CreateSource,
    GmtCreate,
    GmtModified,
}
