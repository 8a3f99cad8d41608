use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Transaction::Table)
                .if_not_exists()
                .col(ColumnDef::new(Transaction::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Transaction::UserId).uuid().not_null())
                // deposit | withdrawal
                .col(ColumnDef::new(Transaction::Type).string_len(20).not_null())
                // Signed: credit > 0, debit < 0
                .col(ColumnDef::new(Transaction::Amount).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Transaction::Notes).text().not_null())
                .col(
                    ColumnDef::new(Transaction::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_transaction_account")
                        .from(Transaction::Table, Transaction::UserId)
                        .to(Account::Table, Account::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transaction_user_created_at")
                .table(Transaction::Table)
                .col(Transaction::UserId)
                .col(Transaction::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transaction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transaction {
    Table,
    Id,
    UserId,
    Type,
    Amount,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
}
