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
                    .table(ConfigInfo::Table)
                    .if_not_exists()
                    .col(id_col(backend, ConfigInfo::Id))
                    .col(ColumnDef::new(ConfigInfo::DataId).string_len(255).not_null())
                    .col(ColumnDef::new(ConfigInfo::GroupId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(ConfigInfo::TenantId)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ConfigInfo::Content).text().not_null())
                    .col(ColumnDef::new(ConfigInfo::Md5).string_len(32))
                    .col(ColumnDef::new(ConfigInfo::AppName).string_len(128))
                    .col(ColumnDef::new(ConfigInfo::CDesc).string_len(256))
                    .col(ColumnDef::new(ConfigInfo::CUse).string_len(64))
                    .col(ColumnDef::new(ConfigInfo::Effect).string_len(64))
                    .col(ColumnDef::new(ConfigInfo::Type).string_len(64))
                    .col(ColumnDef::new(ConfigInfo::CSchema).text())
                    .col(ColumnDef::new(ConfigInfo::SrcUser).text())
                    .col(ColumnDef::new(ConfigInfo::SrcIp).string_len(50))
                    .col(ColumnDef::new(ConfigInfo::GmtCreate).date_time().not_null())
                    .col(ColumnDef::new(ConfigInfo::GmtModified).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_configinfo_datagrouptenant")
                    .table(ConfigInfo::Table)
                    .col(ConfigInfo::DataId)
                    .col(ConfigInfo::GroupId)
                    .col(ConfigInfo::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConfigInfoBeta::Table)
                    .if_not_exists()
                    .col(id_col(backend, ConfigInfoBeta::Id))
                    .col(ColumnDef::new(ConfigInfoBeta::DataId).string_len(255).not_null())
                    .col(ColumnDef::new(ConfigInfoBeta::GroupId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(ConfigInfoBeta::TenantId)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ConfigInfoBeta::AppName).string_len(128))
                    .col(ColumnDef::new(ConfigInfoBeta::Content).text().not_null())
                    .col(ColumnDef::new(ConfigInfoBeta::BetaIps).string_len(1024))
                    .col(ColumnDef::new(ConfigInfoBeta::Md5).string_len(32))
                    .col(ColumnDef::new(ConfigInfoBeta::SrcUser).text())
                    .col(ColumnDef::new(ConfigInfoBeta::SrcIp).string_len(50))
                    .col(ColumnDef::new(ConfigInfoBeta::GmtCreate).date_time().not_null())
                    .col(ColumnDef::new(ConfigInfoBeta::GmtModified).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_configinfobeta_datagrouptenant")
                    .table(ConfigInfoBeta::Table)
                    .col(ConfigInfoBeta::DataId)
                    .col(ConfigInfoBeta::GroupId)
                    .col(ConfigInfoBeta::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConfigInfoTag::Table)
                    .if_not_exists()
                    .col(id_col(backend, ConfigInfoTag::Id))
                    .col(ColumnDef::new(ConfigInfoTag::DataId).string_len(255).not_null())
                    .col(ColumnDef::new(ConfigInfoTag::GroupId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(ConfigInfoTag::TenantId)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ConfigInfoTag::TagId).string_len(128).not_null())
                    .col(ColumnDef::new(ConfigInfoTag::AppName).string_len(128))
                    .col(ColumnDef::new(ConfigInfoTag::Content).text().not_null())
                    .col(ColumnDef::new(ConfigInfoTag::Md5).string_len(32))
                    .col(ColumnDef::new(ConfigInfoTag::SrcUser).text())
                    .col(ColumnDef::new(ConfigInfoTag::SrcIp).string_len(50))
                    .col(ColumnDef::new(ConfigInfoTag::GmtCreate).date_time().not_null())
                    .col(ColumnDef::new(ConfigInfoTag::GmtModified).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_configinfotag_datagrouptenanttag")
                    .table(ConfigInfoTag::Table)
                    .col(ConfigInfoTag::DataId)
                    .col(ConfigInfoTag::GroupId)
                    .col(ConfigInfoTag::TenantId)
                    .col(ConfigInfoTag::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConfigTagsRelation::Table)
                    .if_not_exists()
                    .col(id_col(backend, ConfigTagsRelation::Nid))
                    .col(ColumnDef::new(ConfigTagsRelation::Id).big_integer().not_null())
                    .col(ColumnDef::new(ConfigTagsRelation::TagName).string_len(128).not_null())
                    .col(ColumnDef::new(ConfigTagsRelation::TagType).string_len(64))
                    .col(ColumnDef::new(ConfigTagsRelation::DataId).string_len(255).not_null())
                    .col(ColumnDef::new(ConfigTagsRelation::GroupId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(ConfigTagsRelation::TenantId)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_configtagsrelation_id")
                    .table(ConfigTagsRelation::Table)
                    .col(ConfigTagsRelation::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HisConfigInfo::Table)
                    .if_not_exists()
                    .col(id_col(backend, HisConfigInfo::Nid))
                    .col(ColumnDef::new(HisConfigInfo::Id).big_integer().not_null())
                    .col(ColumnDef::new(HisConfigInfo::DataId).string_len(255).not_null())
                    .col(ColumnDef::new(HisConfigInfo::GroupId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(HisConfigInfo::TenantId)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(HisConfigInfo::AppName).string_len(128))
                    .col(ColumnDef::new(HisConfigInfo::Content).text().not_null())
                    .col(ColumnDef::new(HisConfigInfo::Md5).string_len(32))
                    .col(ColumnDef::new(HisConfigInfo::SrcUser).text())
                    .col(ColumnDef::new(HisConfigInfo::SrcIp).string_len(50))
                    .col(ColumnDef::new(HisConfigInfo::OpType).char_len(10).not_null())
                    .col(ColumnDef::new(HisConfigInfo::GmtCreate).date_time().not_null())
                    .col(ColumnDef::new(HisConfigInfo::GmtModified).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hisconfiginfo_gmt_create")
                    .table(HisConfigInfo::Table)
                    .col(HisConfigInfo::GmtCreate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hisconfiginfo_gmt_modified")
                    .table(HisConfigInfo::Table)
                    .col(HisConfigInfo::GmtModified)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hisconfiginfo_did")
                    .table(HisConfigInfo::Table)
                    .col(HisConfigInfo::DataId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HisConfigInfo::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigTagsRelation::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigInfoTag::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigInfoBeta::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigInfo::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ConfigInfo {
    Table,
    Id,
    DataId,
    GroupId,
    TenantId,
    Content,
    Md5,
    AppName,
    CDesc,
    CUse,
    Effect,
    Type,
    CSchema,
    SrcUser,
    SrcIp,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum ConfigInfoBeta {
    Table,
    Id,
    DataId,
    GroupId,
    TenantId,
    AppName,
    Content,
    BetaIps,
    Md5,
    SrcUser,
    SrcIp,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum ConfigInfoTag {
    Table,
    Id,
    DataId,
    GroupId,
    TenantId,
    TagId,
    AppName,
    Content,
    Md5,
    SrcUser,
    SrcIp,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum ConfigTagsRelation {
    Table,
    Id,
    TagName,
    TagType,
    DataId,
    GroupId,
    TenantId,
    Nid,
}

#[derive(DeriveIden)]
enum HisConfigInfo {
    Table,
    Id,
    Nid,
    DataId,
    GroupId,
    TenantId,
    AppName,
    Content,
    Md5,
    SrcUser,
    SrcIp,
    OpType,
    GmtCreate,
    GmtModified,
}
