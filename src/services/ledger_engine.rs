use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    prelude::Decimal,
    ConnectionTrait,
    DatabaseConnection,
    DatabaseTransaction,
    DbBackend,
    TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::amount::require_text;
use crate::caller::Caller;
use crate::config::BootstrapConfig;
use crate::db::entity::{ account, deposit, transaction, withdrawal };
use crate::db::{
    AccountRepository,
    DepositRepository,
    PlatformConfigInput,
    PlatformConfigRepository,
    TransactionRepository,
    WithdrawalRepository,
};
use crate::enums::AdjustmentDirection;
use crate::error::{ AppError, Result };
use crate::services::adjustment_service::{ Adjustment, AdjustmentService };
use crate::services::deposit_service::{ DepositConfirmation, DepositService };
use crate::services::settings_service::{ PlatformSettings, SettingsService };
use crate::services::withdrawal_service::{ WithdrawalPayout, WithdrawalService };

/// Identity fields shown next to a deposit or withdrawal in admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<account::Model> for OwnerSummary {
    fn from(account: account::Model) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositView {
    #[serde(flatten)]
    pub deposit: deposit::Model,
    pub user: Option<OwnerSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalView {
    #[serde(flatten)]
    pub withdrawal: withdrawal::Model,
    pub user: Option<OwnerSummary>,
}

/// Stored balance against the sum of the account's ledger entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub account_id: Uuid,
    pub balance: Decimal,
    pub ledger_sum: Decimal,
    pub entries: u64,
    pub balanced: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOutcome {
    pub admin: account::Model,
    pub created_admin: bool,
    pub created_settings: bool,
}

/// Entry point for every ledger operation.
///
/// Each mutating call runs in exactly one database transaction: the account
/// row, the workflow row and the ledger entry are committed together or the
/// transaction is dropped and rolled back.
pub struct LedgerEngine {
    db: DatabaseConnection,
    lock_timeout: Option<Duration>,
    bootstrap: BootstrapConfig,
    accounts: Arc<AccountRepository>,
    transactions: Arc<TransactionRepository>,
    deposits: Arc<DepositRepository>,
    withdrawals: Arc<WithdrawalRepository>,
    deposit_service: DepositService,
    withdrawal_service: WithdrawalService,
    adjustment_service: AdjustmentService,
    settings_service: SettingsService,
}

impl LedgerEngine {
    pub fn new(db: DatabaseConnection, bootstrap: BootstrapConfig) -> Self {
        let accounts = Arc::new(AccountRepository::new(db.clone()));
        let transactions = Arc::new(TransactionRepository::new(db.clone()));
        let deposits = Arc::new(DepositRepository::new(db.clone()));
        let withdrawals = Arc::new(WithdrawalRepository::new(db.clone()));
        let platform_config = Arc::new(PlatformConfigRepository::new(db.clone()));

        let deposit_service = DepositService::new(
            accounts.clone(),
            deposits.clone(),
            transactions.clone()
        );
        let withdrawal_service = WithdrawalService::new(
            accounts.clone(),
            withdrawals.clone(),
            transactions.clone()
        );
        let adjustment_service = AdjustmentService::new(accounts.clone(), transactions.clone());
        let settings_service = SettingsService::new(
            db.clone(),
            platform_config,
            bootstrap.clone()
        );

        Self {
            db,
            lock_timeout: None,
            bootstrap,
            accounts,
            transactions,
            deposits,
            withdrawals,
            deposit_service,
            withdrawal_service,
            adjustment_service,
            settings_service,
        }
    }

    /// Bounds how long a transaction waits for another one's row lock
    /// (Postgres only).
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    async fn begin(&self) -> Result<DatabaseTransaction> {
        let txn = self.db.begin().await?;

        if let Some(timeout) = self.lock_timeout {
            if txn.get_database_backend() == DbBackend::Postgres {
                txn.execute_unprepared(
                    &format!("SET LOCAL lock_timeout = '{}ms'", timeout.as_millis())
                ).await?;
            }
        }

        Ok(txn)
    }

    // ─── Bootstrap ──────────────────────────────────────────────────

    /// Seeds the default admin account and the settings row. Safe to repeat.
    pub async fn init(&self) -> Result<InitOutcome> {
        let (admin, created_admin) = match
            self.accounts.find_by_email(&self.bootstrap.admin_email).await?
        {
            Some(existing) => (existing, false),
            None => {
                let created = self.accounts.create(
                    self.bootstrap.admin_email.clone(),
                    self.bootstrap.admin_username.clone(),
                    true
                ).await;
                match created {
                    Ok(admin) => {
                        tracing::info!("Seeded admin account {}", admin.id);
                        (admin, true)
                    }
                    // A concurrent init won the unique email.
                    Err(AppError::InvalidInput(msg)) => {
                        match self.accounts.find_by_email(&self.bootstrap.admin_email).await? {
                            Some(existing) => (existing, false),
                            None => {
                                return Err(AppError::InvalidInput(msg));
                            }
                        }
                    }
                    Err(e) => {
                        return Err(e);
                    }
                }
            }
        };

        let created_settings = self.settings_service.seed().await?;

        Ok(InitOutcome {
            admin,
            created_admin,
            created_settings,
        })
    }

    // ─── Accounts ───────────────────────────────────────────────────

    /// Builds the caller for an identity vouched for by the authentication
    /// layer. The admin flag always comes from the Account Store.
    pub async fn resolve_caller(&self, account_id: Uuid) -> Result<Caller> {
        match self.accounts.find_by_id(account_id).await {
            Ok(account) => Ok(Caller { account_id: account.id, is_admin: account.is_admin }),
            Err(AppError::NotFound(_)) => Err(AppError::Unauthorized),
            Err(e) => Err(e),
        }
    }

    pub async fn create_account(
        &self,
        caller: &Caller,
        email: &str,
        username: &str,
        is_admin: bool
    ) -> Result<account::Model> {
        caller.require_admin()?;

        let email = require_text(email, "email")?.to_lowercase();
        let username = require_text(username, "username")?;

        let account = self.accounts.create(email, username, is_admin).await?;
        tracing::info!("Account {} created by {}", account.id, caller.account_id);

        Ok(account)
    }

    /// Looks up one account; users may only read their own.
    pub async fn get_account(&self, caller: &Caller, account_id: Uuid) -> Result<account::Model> {
        if !caller.is_admin {
            caller.require_self(account_id)?;
        }
        self.accounts.find_by_id(account_id).await
    }

    pub async fn get_profile(&self, caller: &Caller) -> Result<account::Model> {
        self.accounts.find_by_id(caller.account_id).await
    }

    pub async fn update_username(&self, caller: &Caller, username: &str) -> Result<account::Model> {
        let username = require_text(username, "username")?;
        self.accounts.update_username(caller.account_id, username).await
    }

    pub async fn list_accounts(&self, caller: &Caller) -> Result<Vec<account::Model>> {
        caller.require_admin()?;
        self.accounts.list().await
    }

    // ─── Deposits ───────────────────────────────────────────────────

    pub async fn submit_deposit(
        &self,
        caller: &Caller,
        user_id: Uuid,
        amount: Decimal,
        tx_hash: &str
    ) -> Result<deposit::Model> {
        caller.require_self(user_id)?;

        let txn = self.begin().await?;
        let settings = self.settings_service.current(&txn).await?;
        let deposit = self.deposit_service.submit(
            &txn,
            user_id,
            amount,
            tx_hash,
            settings.min_deposit
        ).await?;
        txn.commit().await?;

        tracing::info!("Deposit {} submitted by {} for {}", deposit.id, user_id, deposit.amount);
        Ok(deposit)
    }

    pub async fn confirm_deposit(
        &self,
        caller: &Caller,
        deposit_id: Uuid
    ) -> Result<DepositConfirmation> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let confirmation = self.deposit_service.confirm(&txn, deposit_id).await?;
        txn.commit().await?;

        tracing::info!(
            "Deposit {} confirmed by {}: credited {} to {}, balance {}",
            deposit_id,
            caller.account_id,
            confirmation.deposit.amount,
            confirmation.account.id,
            confirmation.account.balance
        );
        Ok(confirmation)
    }

    pub async fn cancel_deposit(&self, caller: &Caller, deposit_id: Uuid) -> Result<deposit::Model> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let deposit = self.deposit_service.cancel(&txn, deposit_id).await?;
        txn.commit().await?;

        tracing::info!("Deposit {} cancelled by {}", deposit_id, caller.account_id);
        Ok(deposit)
    }

    pub async fn get_deposit(&self, caller: &Caller, deposit_id: Uuid) -> Result<deposit::Model> {
        let deposit = self.deposits.find_by_id(deposit_id).await?;
        if !caller.is_admin {
            caller.require_self(deposit.user_id)?;
        }
        Ok(deposit)
    }

    pub async fn list_my_deposits(&self, caller: &Caller) -> Result<Vec<deposit::Model>> {
        self.deposits.find_by_user(caller.account_id).await
    }

    pub async fn list_deposits(&self, caller: &Caller) -> Result<Vec<DepositView>> {
        caller.require_admin()?;

        let rows = self.deposits.find_all_with_owner().await?;
        Ok(
            rows
                .into_iter()
                .map(|(deposit, owner)| DepositView {
                    deposit,
                    user: owner.map(OwnerSummary::from),
                })
                .collect()
        )
    }

    // ─── Withdrawals ────────────────────────────────────────────────

    pub async fn request_withdrawal(
        &self,
        caller: &Caller,
        user_id: Uuid,
        amount: Decimal,
        wallet_address: &str
    ) -> Result<withdrawal::Model> {
        caller.require_self(user_id)?;

        let txn = self.begin().await?;
        let settings = self.settings_service.current(&txn).await?;
        let withdrawal = self.withdrawal_service.request(
            &txn,
            user_id,
            amount,
            wallet_address,
            settings.withdrawal_limits()
        ).await?;
        txn.commit().await?;

        tracing::info!(
            "Withdrawal {} requested by {} for {}",
            withdrawal.id,
            user_id,
            withdrawal.amount
        );
        Ok(withdrawal)
    }

    pub async fn approve_withdrawal(
        &self,
        caller: &Caller,
        withdrawal_id: Uuid
    ) -> Result<withdrawal::Model> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let withdrawal = self.withdrawal_service.approve(
            &txn,
            withdrawal_id,
            caller.account_id
        ).await?;
        txn.commit().await?;

        tracing::info!("Withdrawal {} approved by {}", withdrawal_id, caller.account_id);
        Ok(withdrawal)
    }

    pub async fn mark_withdrawal_sent(
        &self,
        caller: &Caller,
        withdrawal_id: Uuid,
        tx_hash: &str
    ) -> Result<WithdrawalPayout> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let payout = match self.withdrawal_service.mark_sent(&txn, withdrawal_id, tx_hash).await {
            Ok(payout) => payout,
            Err(AppError::InsufficientBalance) => {
                tracing::warn!(
                    "Withdrawal {} cannot be sent: owner balance no longer covers it",
                    withdrawal_id
                );
                return Err(AppError::InsufficientBalance);
            }
            Err(e) => {
                return Err(e);
            }
        };
        txn.commit().await?;

        tracing::info!(
            "Withdrawal {} sent by {}: debited {} from {}, balance {}",
            withdrawal_id,
            caller.account_id,
            payout.withdrawal.amount,
            payout.account.id,
            payout.account.balance
        );
        Ok(payout)
    }

    pub async fn reject_withdrawal(
        &self,
        caller: &Caller,
        withdrawal_id: Uuid
    ) -> Result<withdrawal::Model> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let withdrawal = self.withdrawal_service.reject(&txn, withdrawal_id).await?;
        txn.commit().await?;

        tracing::info!("Withdrawal {} rejected by {}", withdrawal_id, caller.account_id);
        Ok(withdrawal)
    }

    pub async fn get_withdrawal(
        &self,
        caller: &Caller,
        withdrawal_id: Uuid
    ) -> Result<withdrawal::Model> {
        let withdrawal = self.withdrawals.find_by_id(withdrawal_id).await?;
        if !caller.is_admin {
            caller.require_self(withdrawal.user_id)?;
        }
        Ok(withdrawal)
    }

    pub async fn list_my_withdrawals(&self, caller: &Caller) -> Result<Vec<withdrawal::Model>> {
        self.withdrawals.find_by_user(caller.account_id).await
    }

    pub async fn list_withdrawals(&self, caller: &Caller) -> Result<Vec<WithdrawalView>> {
        caller.require_admin()?;

        let rows = self.withdrawals.find_all_with_owner().await?;
        Ok(
            rows
                .into_iter()
                .map(|(withdrawal, owner)| WithdrawalView {
                    withdrawal,
                    user: owner.map(OwnerSummary::from),
                })
                .collect()
        )
    }

    // ─── Admin adjustment ───────────────────────────────────────────

    pub async fn adjust_balance(
        &self,
        caller: &Caller,
        user_id: Uuid,
        amount: Decimal,
        direction: AdjustmentDirection,
        notes: Option<&str>
    ) -> Result<Adjustment> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let adjustment = self.adjustment_service.adjust(
            &txn,
            user_id,
            amount,
            direction,
            notes
        ).await?;
        txn.commit().await?;

        tracing::info!(
            "Admin {} applied {} of {} to {}, balance {}",
            caller.account_id,
            direction,
            amount,
            user_id,
            adjustment.account.balance
        );
        Ok(adjustment)
    }

    // ─── Ledger ─────────────────────────────────────────────────────

    pub async fn list_my_transactions(
        &self,
        caller: &Caller,
        limit: Option<u64>,
        offset: Option<u64>
    ) -> Result<Vec<transaction::Model>> {
        self.transactions.find_by_user_id(caller.account_id, limit, offset).await
    }

    pub async fn list_transactions(
        &self,
        caller: &Caller,
        account_id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>
    ) -> Result<Vec<transaction::Model>> {
        caller.require_admin()?;
        self.accounts.find_by_id(account_id).await?;
        self.transactions.find_by_user_id(account_id, limit, offset).await
    }

    /// Compares the cached balance with the sum of ledger entries under the
    /// account lock, so no concurrent write can split the two reads.
    pub async fn reconcile(&self, caller: &Caller, account_id: Uuid) -> Result<Reconciliation> {
        caller.require_admin()?;

        let txn = self.begin().await?;
        let account = self.accounts.lock(&txn, account_id).await?;
        let ledger_sum = self.transactions.sum_for_user(&txn, account_id).await?;
        let entries = self.transactions.count_for_user(&txn, account_id).await?;
        txn.commit().await?;

        let balanced = account.balance == ledger_sum;
        if !balanced {
            tracing::error!(
                "Ledger mismatch for {}: balance {} vs entries {}",
                account_id,
                account.balance,
                ledger_sum
            );
        }

        Ok(Reconciliation {
            account_id,
            balance: account.balance,
            ledger_sum,
            entries,
            balanced,
        })
    }

    // ─── Settings ───────────────────────────────────────────────────

    pub async fn get_settings(&self, caller: &Caller) -> Result<PlatformSettings> {
        caller.require_admin()?;
        self.settings_service.current(&self.db).await
    }

    pub async fn update_settings(
        &self,
        caller: &Caller,
        input: PlatformConfigInput
    ) -> Result<PlatformSettings> {
        caller.require_admin()?;
        self.settings_service.update(input).await
    }
}
