use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    DatabaseConnection,
    DatabaseTransaction,
    QueryOrder,
    QuerySelect,
    Set,
    SqlErr,
};
use uuid::Uuid;

use crate::amount;
use crate::error::{ AppError, Result };

pub mod entity;
pub use entity::*;

mod transaction_repository;
pub use transaction_repository::TransactionRepository;

mod deposit_repository;
pub use deposit_repository::DepositRepository;

mod withdrawal_repository;
pub use withdrawal_repository::WithdrawalRepository;

mod platform_config_repository;
pub use platform_config_repository::{ PlatformConfigRepository, PlatformConfigInput };

/// Account Store: identities and their cached balances.
///
/// Balance writes (`credit`, `debit`) only accept an open transaction, so a
/// balance can never move outside the atomic unit that also appends its
/// ledger entry. Both lock the row before computing the new balance.
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        email: String,
        username: String,
        is_admin: bool
    ) -> Result<entity::account::Model> {
        let account = entity::account::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            username: Set(username),
            balance: Set(Decimal::ZERO),
            is_admin: Set(is_admin),
            created_at: Set(chrono::Utc::now()),
        };

        let account = account.insert(&self.db).await.map_err(map_unique_violation)?;
        Ok(normalized(account))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<entity::account::Model> {
        entity::account::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .map(normalized)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<entity::account::Model>> {
        let account = entity::account::Entity
            ::find()
            .filter(entity::account::Column::Email.eq(email))
            .one(&self.db).await?;

        Ok(account.map(normalized))
    }

    pub async fn list(&self) -> Result<Vec<entity::account::Model>> {
        let accounts = entity::account::Entity
            ::find()
            .order_by_desc(entity::account::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(accounts.into_iter().map(normalized).collect())
    }

    pub async fn update_username(
        &self,
        id: Uuid,
        username: String
    ) -> Result<entity::account::Model> {
        let account = self.find_by_id(id).await?;

        let mut active: entity::account::ActiveModel = account.into();
        active.username = Set(username);
        let updated = active.update(&self.db).await.map_err(map_unique_violation)?;

        Ok(normalized(updated))
    }

    /// Reads the account row and holds its lock until `txn` ends.
    pub(crate) async fn lock(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid
    ) -> Result<entity::account::Model> {
        entity::account::Entity
            ::find_by_id(id)
            .lock_exclusive()
            .one(txn).await?
            .map(normalized)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }

    pub(crate) async fn credit(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        amount: Decimal
    ) -> Result<entity::account::Model> {
        let current = self.lock(txn, id).await?;
        let balance = current.balance + amount;

        self.write_balance(txn, &current, balance, None).await
    }

    pub(crate) async fn debit(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        amount: Decimal
    ) -> Result<entity::account::Model> {
        let current = self.lock(txn, id).await?;
        if current.balance < amount {
            return Err(AppError::InsufficientBalance);
        }
        let balance = current.balance - amount;

        self.write_balance(txn, &current, balance, Some(amount)).await
    }

    /// Compare-and-set against the balance read under the row lock. The new
    /// value is computed in Rust; the store only persists it.
    async fn write_balance(
        &self,
        txn: &DatabaseTransaction,
        current: &entity::account::Model,
        balance: Decimal,
        debited: Option<Decimal>
    ) -> Result<entity::account::Model> {
        let balance = amount::normalize(balance);

        let mut update = entity::account::Entity
            ::update_many()
            .col_expr(entity::account::Column::Balance, Expr::value(balance))
            .filter(entity::account::Column::Id.eq(current.id))
            .filter(entity::account::Column::Balance.eq(current.balance));
        if let Some(amount) = debited {
            update = update.filter(entity::account::Column::Balance.gte(amount));
        }

        let result = update.exec(txn).await?;
        if result.rows_affected == 0 {
            tracing::warn!("Balance of {} changed under its row lock", current.id);
            return Err(
                AppError::InvalidState("Account balance changed concurrently, retry".to_string())
            );
        }

        Ok(entity::account::Model {
            balance,
            ..current.clone()
        })
    }
}

fn normalized(mut account: entity::account::Model) -> entity::account::Model {
    account.balance = amount::normalize(account.balance);
    account
}

fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::InvalidInput("Email or username already taken".to_string())
        }
        _ => AppError::Database(err),
    }
}
