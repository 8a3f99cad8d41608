use std::sync::Arc;

use sea_orm::{ prelude::Decimal, DatabaseTransaction };
use serde::Serialize;
use uuid::Uuid;

use crate::amount;
use crate::db::entity::{ account, deposit, transaction };
use crate::db::{ AccountRepository, DepositRepository, TransactionRepository };
use crate::enums::{ DepositStatus, TransactionType };
use crate::error::{ AppError, Result };

/// Result of a confirmed deposit: the settled row, the credited account and
/// the ledger entry justifying the credit.
#[derive(Debug, Clone, Serialize)]
pub struct DepositConfirmation {
    pub deposit: deposit::Model,
    pub account: account::Model,
    pub transaction: transaction::Model,
}

/// Deposit Workflow. Every method runs inside the caller's transaction.
pub struct DepositService {
    accounts: Arc<AccountRepository>,
    deposits: Arc<DepositRepository>,
    transactions: Arc<TransactionRepository>,
}

impl DepositService {
    pub fn new(
        accounts: Arc<AccountRepository>,
        deposits: Arc<DepositRepository>,
        transactions: Arc<TransactionRepository>
    ) -> Self {
        Self {
            accounts,
            deposits,
            transactions,
        }
    }

    /// Records a user's claim of an on-chain payment. No balance effect.
    pub async fn submit(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: Decimal,
        tx_hash: &str,
        min_deposit: Decimal
    ) -> Result<deposit::Model> {
        let amount = amount::validate_positive(amount, "amount")?;
        let tx_hash = amount::require_text(tx_hash, "txHash")?;

        if amount < min_deposit {
            return Err(AppError::InvalidInput(format!("Minimum deposit is {}", min_deposit)));
        }

        self.accounts.lock(txn, user_id).await?;
        self.deposits.create(txn, user_id, amount, tx_hash).await
    }

    /// Settles a pending deposit and credits its owner.
    pub async fn confirm(
        &self,
        txn: &DatabaseTransaction,
        deposit_id: Uuid
    ) -> Result<DepositConfirmation> {
        let current = self.deposits.lock(txn, deposit_id).await?;
        ensure_transition(current.status, DepositStatus::Confirmed)?;

        self.accounts.lock(txn, current.user_id).await?;

        let deposit = self.deposits.mark_confirmed(txn, deposit_id).await?;
        let account = self.accounts.credit(txn, deposit.user_id, deposit.amount).await?;
        let transaction = self.transactions.append(
            txn,
            deposit.user_id,
            TransactionType::Deposit,
            deposit.amount,
            format!("Deposit confirmed: {}", deposit.tx_hash)
        ).await?;

        Ok(DepositConfirmation {
            deposit,
            account,
            transaction,
        })
    }

    pub async fn cancel(&self, txn: &DatabaseTransaction, deposit_id: Uuid) -> Result<deposit::Model> {
        let current = self.deposits.lock(txn, deposit_id).await?;
        ensure_transition(current.status, DepositStatus::Cancelled)?;

        self.deposits.mark_cancelled(txn, deposit_id).await
    }
}

fn ensure_transition(current: DepositStatus, next: DepositStatus) -> Result<()> {
    if !current.can_transition_to(next) {
        return Err(
            AppError::InvalidState(format!("Cannot move deposit from {} to {}", current, next))
        );
    }
    Ok(())
}
