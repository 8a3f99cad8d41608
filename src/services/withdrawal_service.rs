use std::sync::Arc;

use sea_orm::{ prelude::Decimal, DatabaseTransaction };
use serde::Serialize;
use uuid::Uuid;

use crate::amount;
use crate::db::entity::{ account, transaction, withdrawal };
use crate::db::{ AccountRepository, TransactionRepository, WithdrawalRepository };
use crate::enums::{ TransactionType, WithdrawalStatus };
use crate::error::{ AppError, Result };

/// Per-request bounds taken from the platform settings.
#[derive(Debug, Clone, Copy)]
pub struct WithdrawalLimits {
    pub min: Decimal,
    pub max: Decimal,
}

/// Result of fulfilling a withdrawal: the sent row, the debited account and
/// the ledger entry justifying the debit.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalPayout {
    pub withdrawal: withdrawal::Model,
    pub account: account::Model,
    pub transaction: transaction::Model,
}

/// Withdrawal Workflow. Funds are not reserved while a request is pending or
/// approved; the debit happens only when the payout is marked sent.
pub struct WithdrawalService {
    accounts: Arc<AccountRepository>,
    withdrawals: Arc<WithdrawalRepository>,
    transactions: Arc<TransactionRepository>,
}

impl WithdrawalService {
    pub fn new(
        accounts: Arc<AccountRepository>,
        withdrawals: Arc<WithdrawalRepository>,
        transactions: Arc<TransactionRepository>
    ) -> Self {
        Self {
            accounts,
            withdrawals,
            transactions,
        }
    }

    pub async fn request(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: Decimal,
        wallet_address: &str,
        limits: WithdrawalLimits
    ) -> Result<withdrawal::Model> {
        let amount = amount::validate_positive(amount, "amount")?;
        let wallet_address = amount::require_text(wallet_address, "walletAddress")?;

        if amount < limits.min {
            return Err(AppError::InvalidInput(format!("Minimum withdrawal is {}", limits.min)));
        }
        if amount > limits.max {
            return Err(AppError::InvalidInput(format!("Maximum withdrawal is {}", limits.max)));
        }

        // Checked against the balance now; nothing is held back for the request.
        let account = self.accounts.lock(txn, user_id).await?;
        if amount > account.balance {
            tracing::warn!(
                "Withdrawal request of {} rejected for {}: balance {}",
                amount,
                user_id,
                account.balance
            );
            return Err(AppError::InsufficientBalance);
        }

        self.withdrawals.create(txn, user_id, amount, wallet_address).await
    }

    pub async fn approve(
        &self,
        txn: &DatabaseTransaction,
        withdrawal_id: Uuid,
        approver_id: Uuid
    ) -> Result<withdrawal::Model> {
        let current = self.withdrawals.lock(txn, withdrawal_id).await?;
        ensure_transition(current.status, WithdrawalStatus::Approved)?;

        self.withdrawals.mark_approved(txn, withdrawal_id, approver_id).await
    }

    /// Records the external payout and debits the owner. Fails with
    /// `InsufficientBalance` when other payouts already drained the account.
    pub async fn mark_sent(
        &self,
        txn: &DatabaseTransaction,
        withdrawal_id: Uuid,
        tx_hash: &str
    ) -> Result<WithdrawalPayout> {
        let tx_hash = amount::require_text(tx_hash, "txHash")?;

        let current = self.withdrawals.lock(txn, withdrawal_id).await?;
        ensure_transition(current.status, WithdrawalStatus::Sent)?;

        let account = self.accounts.debit(txn, current.user_id, current.amount).await?;
        let withdrawal = self.withdrawals.mark_sent(txn, withdrawal_id, tx_hash).await?;
        let transaction = self.transactions.append(
            txn,
            withdrawal.user_id,
            TransactionType::Withdrawal,
            -withdrawal.amount,
            format!(
                "Withdrawal sent: {} to {}",
                withdrawal.tx_hash.as_deref().unwrap_or_default(),
                withdrawal.wallet_address
            )
        ).await?;

        Ok(WithdrawalPayout {
            withdrawal,
            account,
            transaction,
        })
    }

    /// Cancels a request that has not been paid out. No balance effect.
    pub async fn reject(
        &self,
        txn: &DatabaseTransaction,
        withdrawal_id: Uuid
    ) -> Result<withdrawal::Model> {
        let current = self.withdrawals.lock(txn, withdrawal_id).await?;
        ensure_transition(current.status, WithdrawalStatus::Cancelled)?;

        self.withdrawals.mark_cancelled(txn, withdrawal_id).await
    }
}

fn ensure_transition(current: WithdrawalStatus, next: WithdrawalStatus) -> Result<()> {
    if !current.can_transition_to(next) {
        return Err(
            AppError::InvalidState(format!("Cannot move withdrawal from {} to {}", current, next))
        );
    }
    Ok(())
}
