use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Account::Table)
                .if_not_exists()
                .col(ColumnDef::new(Account::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Account::Email).string().not_null().unique_key())
                .col(ColumnDef::new(Account::Username).string().not_null().unique_key())
                .col(
                    ColumnDef::new(Account::Balance)
                        .decimal_len(16, 8)
                        .not_null()
                        .default(0)
                        .check(Expr::col(Account::Balance).gte(0))
                )
                .col(ColumnDef::new(Account::IsAdmin).boolean().not_null().default(false))
                .col(
                    ColumnDef::new(Account::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_account_created_at")
                .table(Account::Table)
                .col(Account::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Account::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
    Email,
    Username,
    Balance,
    IsAdmin,
    CreatedAt,
}
