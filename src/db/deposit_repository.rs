use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    DatabaseConnection,
    DatabaseTransaction,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::amount;
use crate::db::entity::{ account, deposit, Deposit };
use crate::enums::DepositStatus;
use crate::error::{ AppError, Result };

pub struct DepositRepository {
    db: DatabaseConnection,
}

impl DepositRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn create(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: Decimal,
        tx_hash: String
    ) -> Result<deposit::Model> {
        let model = deposit::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(amount),
            tx_hash: Set(tx_hash),
            status: Set(DepositStatus::Pending),
            created_at: Set(chrono::Utc::now()),
            confirmed_at: Set(None),
        };

        let model = model.insert(txn).await?;
        Ok(normalized(model))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<deposit::Model> {
        Deposit::find_by_id(id)
            .one(&self.db).await?
            .map(normalized)
            .ok_or_else(|| AppError::NotFound("Deposit not found".to_string()))
    }

    pub(crate) async fn lock(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<deposit::Model> {
        Deposit::find_by_id(id)
            .lock_exclusive()
            .one(txn).await?
            .map(normalized)
            .ok_or_else(|| AppError::NotFound("Deposit not found".to_string()))
    }

    pub(crate) async fn mark_confirmed(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid
    ) -> Result<deposit::Model> {
        let result = Deposit::update_many()
            .col_expr(deposit::Column::Status, Expr::value(DepositStatus::Confirmed.to_value()))
            .col_expr(deposit::Column::ConfirmedAt, Expr::value(chrono::Utc::now()))
            .filter(deposit::Column::Id.eq(id))
            .filter(deposit::Column::Status.eq(DepositStatus::Pending))
            .exec(txn).await?;

        self.after_transition(txn, id, result.rows_affected).await
    }

    pub(crate) async fn mark_cancelled(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid
    ) -> Result<deposit::Model> {
        let result = Deposit::update_many()
            .col_expr(deposit::Column::Status, Expr::value(DepositStatus::Cancelled.to_value()))
            .filter(deposit::Column::Id.eq(id))
            .filter(deposit::Column::Status.eq(DepositStatus::Pending))
            .exec(txn).await?;

        self.after_transition(txn, id, result.rows_affected).await
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<deposit::Model>> {
        let deposits = Deposit::find()
            .filter(deposit::Column::UserId.eq(user_id))
            .order_by_desc(deposit::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(deposits.into_iter().map(normalized).collect())
    }

    /// Every deposit, newest first, with its owning account.
    pub async fn find_all_with_owner(
        &self
    ) -> Result<Vec<(deposit::Model, Option<account::Model>)>> {
        let rows = Deposit::find()
            .find_also_related(account::Entity)
            .order_by_desc(deposit::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(
            rows
                .into_iter()
                .map(|(deposit, owner)| (normalized(deposit), owner))
                .collect()
        )
    }

    async fn after_transition(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        rows_affected: u64
    ) -> Result<deposit::Model> {
        let current = self.lock(txn, id).await?;
        if rows_affected == 0 {
            return Err(
                AppError::InvalidState(format!("Deposit is already {}", current.status))
            );
        }
        Ok(current)
    }
}

fn normalized(mut deposit: deposit::Model) -> deposit::Model {
    deposit.amount = amount::normalize(deposit.amount);
    deposit
}
