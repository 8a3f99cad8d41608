use std::sync::Arc;

use sea_orm::{ prelude::Decimal, DatabaseTransaction };
use serde::Serialize;
use uuid::Uuid;

use crate::amount;
use crate::db::entity::{ account, transaction };
use crate::db::{ AccountRepository, TransactionRepository };
use crate::enums::AdjustmentDirection;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct Adjustment {
    pub account: account::Model,
    pub transaction: transaction::Model,
}

/// Manual credit/debit path for operator corrections. Obeys the same
/// non-negative balance rule as the workflows.
pub struct AdjustmentService {
    accounts: Arc<AccountRepository>,
    transactions: Arc<TransactionRepository>,
}

impl AdjustmentService {
    pub fn new(accounts: Arc<AccountRepository>, transactions: Arc<TransactionRepository>) -> Self {
        Self {
            accounts,
            transactions,
        }
    }

    pub async fn adjust(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: Decimal,
        direction: AdjustmentDirection,
        notes: Option<&str>
    ) -> Result<Adjustment> {
        let amount = amount::validate_positive(amount, "amount")?;

        self.accounts.lock(txn, user_id).await?;

        let account = match direction {
            AdjustmentDirection::Credit => self.accounts.credit(txn, user_id, amount).await?,
            AdjustmentDirection::Debit => self.accounts.debit(txn, user_id, amount).await?,
        };

        let notes = match notes.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => "No notes",
        };

        let transaction = self.transactions.append(
            txn,
            user_id,
            direction.transaction_type(),
            direction.signed(amount),
            format!("Admin {}: {}", direction, notes)
        ).await?;

        Ok(Adjustment {
            account,
            transaction,
        })
    }
}
