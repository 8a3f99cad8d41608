use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    DatabaseConnection,
    DatabaseTransaction,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    prelude::Decimal,
};
use uuid::Uuid;

use crate::amount;
use crate::db::entity::{ transaction, Transaction };
use crate::enums::TransactionType;
use crate::error::Result;

/// Transaction Log: the append-only audit trail behind every balance.
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts one entry inside the caller's atomic unit. Existing rows are
    /// never touched.
    pub(crate) async fn append(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        tx_type: TransactionType,
        signed_amount: Decimal,
        notes: String
    ) -> Result<transaction::Model> {
        let entry = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            tx_type: Set(tx_type),
            amount: Set(signed_amount),
            notes: Set(notes),
            created_at: Set(chrono::Utc::now()),
        };

        let entry = entry.insert(txn).await?;
        Ok(normalized(entry))
    }

    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>
    ) -> Result<Vec<transaction::Model>> {
        let mut query = Transaction::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        if let Some(offset) = offset {
            query = query.offset(offset);
        }

        let transactions = query.all(&self.db).await?;

        Ok(transactions.into_iter().map(normalized).collect())
    }

    /// Sum of every signed entry for the account, read through `conn` so it can
    /// share a snapshot with the balance it is compared against.
    pub async fn sum_for_user<C: ConnectionTrait>(&self, conn: &C, user_id: Uuid) -> Result<Decimal> {
        let amounts: Vec<Decimal> = Transaction::find()
            .select_only()
            .column(transaction::Column::Amount)
            .filter(transaction::Column::UserId.eq(user_id))
            .into_tuple()
            .all(conn).await?;

        Ok(amounts.into_iter().map(amount::normalize).sum())
    }

    pub async fn count_for_user<C: ConnectionTrait>(&self, conn: &C, user_id: Uuid) -> Result<u64> {
        let count = Transaction::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .count(conn).await?;

        Ok(count)
    }
}

fn normalized(mut entry: transaction::Model) -> transaction::Model {
    entry.amount = amount::normalize(entry.amount);
    entry
}
