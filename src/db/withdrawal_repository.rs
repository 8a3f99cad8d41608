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
use crate::db::entity::{ account, withdrawal, Withdrawal };
use crate::enums::WithdrawalStatus;
use crate::error::{ AppError, Result };

pub struct WithdrawalRepository {
    db: DatabaseConnection,
}

impl WithdrawalRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn create(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: Decimal,
        wallet_address: String
    ) -> Result<withdrawal::Model> {
        let model = withdrawal::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(amount),
            wallet_address: Set(wallet_address),
            status: Set(WithdrawalStatus::Pending),
            requested_at: Set(chrono::Utc::now()),
            approved_by: Set(None),
            approved_at: Set(None),
            sent_at: Set(None),
            tx_hash: Set(None),
        };

        let model = model.insert(txn).await?;
        Ok(normalized(model))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<withdrawal::Model> {
        Withdrawal::find_by_id(id)
            .one(&self.db).await?
            .map(normalized)
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))
    }

    pub(crate) async fn lock(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid
    ) -> Result<withdrawal::Model> {
        Withdrawal::find_by_id(id)
            .lock_exclusive()
            .one(txn).await?
            .map(normalized)
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))
    }

    pub(crate) async fn mark_approved(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        approver_id: Uuid
    ) -> Result<withdrawal::Model> {
        let result = Withdrawal::update_many()
            .col_expr(
                withdrawal::Column::Status,
                Expr::value(WithdrawalStatus::Approved.to_value())
            )
            .col_expr(withdrawal::Column::ApprovedBy, Expr::value(approver_id))
            .col_expr(withdrawal::Column::ApprovedAt, Expr::value(chrono::Utc::now()))
            .filter(withdrawal::Column::Id.eq(id))
            .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
            .exec(txn).await?;

        self.after_transition(txn, id, result.rows_affected).await
    }

    pub(crate) async fn mark_sent(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        tx_hash: String
    ) -> Result<withdrawal::Model> {
        let result = Withdrawal::update_many()
            .col_expr(withdrawal::Column::Status, Expr::value(WithdrawalStatus::Sent.to_value()))
            .col_expr(withdrawal::Column::SentAt, Expr::value(chrono::Utc::now()))
            .col_expr(withdrawal::Column::TxHash, Expr::value(tx_hash))
            .filter(withdrawal::Column::Id.eq(id))
            .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Approved))
            .exec(txn).await?;

        self.after_transition(txn, id, result.rows_affected).await
    }

    pub(crate) async fn mark_cancelled(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid
    ) -> Result<withdrawal::Model> {
        let result = Withdrawal::update_many()
            .col_expr(
                withdrawal::Column::Status,
                Expr::value(WithdrawalStatus::Cancelled.to_value())
            )
            .filter(withdrawal::Column::Id.eq(id))
            .filter(
                withdrawal::Column::Status.is_in([
                    WithdrawalStatus::Pending,
                    WithdrawalStatus::Approved,
                ])
            )
            .exec(txn).await?;

        self.after_transition(txn, id, result.rows_affected).await
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<withdrawal::Model>> {
        let withdrawals = Withdrawal::find()
            .filter(withdrawal::Column::UserId.eq(user_id))
            .order_by_desc(withdrawal::Column::RequestedAt)
            .all(&self.db).await?;

        Ok(withdrawals.into_iter().map(normalized).collect())
    }

    /// Every withdrawal, newest first, with its owning account.
    pub async fn find_all_with_owner(
        &self
    ) -> Result<Vec<(withdrawal::Model, Option<account::Model>)>> {
        let rows = Withdrawal::find()
            .find_also_related(account::Entity)
            .order_by_desc(withdrawal::Column::RequestedAt)
            .all(&self.db).await?;

        Ok(
            rows
                .into_iter()
                .map(|(withdrawal, owner)| (normalized(withdrawal), owner))
                .collect()
        )
    }

    async fn after_transition(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        rows_affected: u64
    ) -> Result<withdrawal::Model> {
        let current = self.lock(txn, id).await?;
        if rows_affected == 0 {
            return Err(
                AppError::InvalidState(format!("Withdrawal is already {}", current.status))
            );
        }
        Ok(current)
    }
}

fn normalized(mut withdrawal: withdrawal::Model) -> withdrawal::Model {
    withdrawal.amount = amount::normalize(withdrawal.amount);
    withdrawal
}
