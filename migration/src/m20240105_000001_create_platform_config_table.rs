use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(PlatformConfig::Table)
                .if_not_exists()
                .col(ColumnDef::new(PlatformConfig::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(PlatformConfig::DepositAddress).string().not_null())
                .col(ColumnDef::new(PlatformConfig::AdminWallet).string().not_null())
                .col(ColumnDef::new(PlatformConfig::MinDeposit).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(PlatformConfig::MinWithdrawal).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(PlatformConfig::MaxWithdrawal).decimal_len(16, 8).not_null())
                .col(
                    ColumnDef::new(PlatformConfig::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PlatformConfig::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PlatformConfig {
    Table,
    Id,
    DepositAddress,
    AdminWallet,
    MinDeposit,
    MinWithdrawal,
    MaxWithdrawal,
    UpdatedAt,
}
