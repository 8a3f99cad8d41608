use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Withdrawal::Table)
                .if_not_exists()
                .col(ColumnDef::new(Withdrawal::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Withdrawal::UserId).uuid().not_null())
                .col(ColumnDef::new(Withdrawal::Amount).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Withdrawal::WalletAddress).string().not_null())
                // pending | approved | sent | cancelled
                .col(ColumnDef::new(Withdrawal::Status).string_len(20).not_null())
                .col(
                    ColumnDef::new(Withdrawal::RequestedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(ColumnDef::new(Withdrawal::ApprovedBy).uuid().null())
                .col(ColumnDef::new(Withdrawal::ApprovedAt).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Withdrawal::SentAt).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Withdrawal::TxHash).string().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_withdrawal_account")
                        .from(Withdrawal::Table, Withdrawal::UserId)
                        .to(Account::Table, Account::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_withdrawal_approver")
                        .from(Withdrawal::Table, Withdrawal::ApprovedBy)
                        .to(Account::Table, Account::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_withdrawal_user_requested_at")
                .table(Withdrawal::Table)
                .col(Withdrawal::UserId)
                .col(Withdrawal::RequestedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Withdrawal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Withdrawal {
    Table,
    Id,
    UserId,
    Amount,
    WalletAddress,
    Status,
    RequestedAt,
    ApprovedBy,
    ApprovedAt,
    SentAt,
    TxHash,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
}
