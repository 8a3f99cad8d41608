use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Deposit::Table)
                .if_not_exists()
                .col(ColumnDef::new(Deposit::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Deposit::UserId).uuid().not_null())
                .col(ColumnDef::new(Deposit::Amount).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Deposit::TxHash).string().not_null())
                // pending | confirmed | cancelled
                .col(ColumnDef::new(Deposit::Status).string_len(20).not_null())
                .col(
                    ColumnDef::new(Deposit::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(ColumnDef::new(Deposit::ConfirmedAt).timestamp_with_time_zone().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_deposit_account")
                        .from(Deposit::Table, Deposit::UserId)
                        .to(Account::Table, Account::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_deposit_user_created_at")
                .table(Deposit::Table)
                .col(Deposit::UserId)
                .col(Deposit::CreatedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_deposit_status")
                .table(Deposit::Table)
                .col(Deposit::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Deposit::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Deposit {
    Table,
    Id,
    UserId,
    Amount,
    TxHash,
    Status,
    CreatedAt,
    ConfirmedAt,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
}
