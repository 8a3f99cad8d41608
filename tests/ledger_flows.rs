mod common;

use custody_ledger::{
    AdjustmentDirection,
    AppError,
    DepositStatus,
    TransactionType,
    WithdrawalStatus,
};
use custody_ledger::db::entity::{ Account, PlatformConfig };
use rust_decimal_macros::dec;
use sea_orm::{ EntityTrait, PaginatorTrait };

#[tokio::test]
async fn init_is_idempotent() {
    let ctx = common::setup().await;

    let again = ctx.engine.init().await.unwrap();

    assert!(!again.created_admin);
    assert!(!again.created_settings);
    assert_eq!(again.admin.id, ctx.admin.account_id);
    assert!(again.admin.is_admin);
}

#[tokio::test]
async fn overlapping_init_calls_seed_once() {
    let (db, engine) = common::fresh_engine().await;

    let (first, second) = tokio::join!(engine.init(), engine.init());
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.admin.id, second.admin.id);
    assert_eq!([first.created_admin, second.created_admin].iter().filter(|c| **c).count(), 1);
    assert_eq!(
        [first.created_settings, second.created_settings].iter().filter(|c| **c).count(),
        1
    );

    assert_eq!(PlatformConfig::find().count(&db).await.unwrap(), 1);
    assert_eq!(Account::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn settings_update_without_stored_row_keeps_a_single_row() {
    let (db, engine) = common::fresh_engine().await;
    let admin = engine.init().await.unwrap().admin;
    let admin = custody_ledger::Caller::admin(admin.id);

    PlatformConfig::delete_many().exec(&db).await.unwrap();
    engine
        .update_settings(&admin, custody_ledger::db::PlatformConfigInput {
            min_deposit: Some(dec!(0.002)),
            ..Default::default()
        }).await
        .unwrap();
    let reseeded = engine.init().await.unwrap();

    assert!(!reseeded.created_settings);
    assert_eq!(PlatformConfig::find().count(&db).await.unwrap(), 1);
    assert_eq!(engine.get_settings(&admin).await.unwrap().min_deposit, dec!(0.002));
}

#[tokio::test]
async fn admin_credit_updates_balance_and_ledger() {
    let ctx = common::setup().await;
    let user = ctx.user("alice").await;

    let adjustment = ctx.engine
        .adjust_balance(
            &ctx.admin,
            user.account_id,
            dec!(0.5),
            AdjustmentDirection::Credit,
            Some("welcome bonus")
        ).await
        .unwrap();

    assert_eq!(adjustment.account.balance, dec!(0.5));
    assert_eq!(adjustment.transaction.tx_type, TransactionType::Deposit);
    assert_eq!(adjustment.transaction.amount, dec!(0.5));
    assert_eq!(adjustment.transaction.notes, "Admin credit: welcome bonus");

    let entries = ctx.engine.list_my_transactions(&user, None, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(ctx.balance(&user).await, dec!(0.5));
}

#[tokio::test]
async fn admin_debit_cannot_overdraw() {
    let ctx = common::setup().await;
    let user = ctx.user("bob").await;
    ctx.fund(&user, dec!(0.2)).await;

    let result = ctx.engine.adjust_balance(
        &ctx.admin,
        user.account_id,
        dec!(0.3),
        AdjustmentDirection::Debit,
        None
    ).await;

    assert!(matches!(result, Err(AppError::InsufficientBalance)));
    assert_eq!(ctx.balance(&user).await, dec!(0.2));
    assert_eq!(ctx.engine.list_my_transactions(&user, None, None).await.unwrap().len(), 1);

    let debit = ctx.engine
        .adjust_balance(&ctx.admin, user.account_id, dec!(0.2), AdjustmentDirection::Debit, None).await
        .unwrap();
    assert_eq!(debit.account.balance, dec!(0));
    assert_eq!(debit.transaction.amount, dec!(-0.2));
    assert_eq!(debit.transaction.notes, "Admin debit: No notes");
}

#[tokio::test]
async fn debiting_the_reported_balance_empties_the_account() {
    let ctx = common::setup().await;
    let user = ctx.user("amber").await;
    ctx.fund(&user, dec!(0.3)).await;

    let first = ctx.engine
        .adjust_balance(&ctx.admin, user.account_id, dec!(0.1), AdjustmentDirection::Debit, None).await
        .unwrap();
    assert_eq!(first.account.balance, dec!(0.2));

    let second = ctx.engine
        .adjust_balance(&ctx.admin, user.account_id, dec!(0.2), AdjustmentDirection::Debit, None).await
        .unwrap();
    assert_eq!(second.account.balance, dec!(0));

    let report = ctx.engine.reconcile(&ctx.admin, user.account_id).await.unwrap();
    assert!(report.balanced);
    assert_eq!(report.balance, dec!(0));
}

#[tokio::test]
async fn approved_withdrawal_of_remaining_balance_can_be_sent() {
    let ctx = common::setup().await;
    let user = ctx.user("basil").await;
    ctx.fund(&user, dec!(0.7)).await;
    ctx.engine
        .adjust_balance(&ctx.admin, user.account_id, dec!(0.6), AdjustmentDirection::Debit, None).await
        .unwrap();
    assert_eq!(ctx.balance(&user).await, dec!(0.1));

    let withdrawal = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.1), "bc1qbasil").await
        .unwrap();
    ctx.engine.approve_withdrawal(&ctx.admin, withdrawal.id).await.unwrap();

    let payout = ctx.engine
        .mark_withdrawal_sent(&ctx.admin, withdrawal.id, "out-basil").await
        .unwrap();
    assert_eq!(payout.account.balance, dec!(0));
    assert_eq!(ctx.balance(&user).await, dec!(0));
}

#[tokio::test]
async fn deposit_confirmation_credits_owner_once() {
    let ctx = common::setup().await;
    let user = ctx.user("carol").await;

    let deposit = ctx.engine
        .submit_deposit(&user, user.account_id, dec!(0.01), "abc123").await
        .unwrap();
    assert_eq!(deposit.status, DepositStatus::Pending);
    assert_eq!(ctx.balance(&user).await, dec!(0));

    let confirmation = ctx.engine.confirm_deposit(&ctx.admin, deposit.id).await.unwrap();
    assert_eq!(confirmation.deposit.status, DepositStatus::Confirmed);
    assert!(confirmation.deposit.confirmed_at.is_some());
    assert_eq!(confirmation.account.balance, dec!(0.01));
    assert_eq!(confirmation.transaction.notes, "Deposit confirmed: abc123");

    let second = ctx.engine.confirm_deposit(&ctx.admin, deposit.id).await;
    assert!(matches!(second, Err(AppError::InvalidState(_))));

    let cancel = ctx.engine.cancel_deposit(&ctx.admin, deposit.id).await;
    assert!(matches!(cancel, Err(AppError::InvalidState(_))));

    assert_eq!(ctx.balance(&user).await, dec!(0.01));
    assert_eq!(ctx.engine.list_my_transactions(&user, None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_deposit_has_no_balance_effect() {
    let ctx = common::setup().await;
    let user = ctx.user("dave").await;

    let deposit = ctx.engine
        .submit_deposit(&user, user.account_id, dec!(0.002), "hash-1").await
        .unwrap();
    let cancelled = ctx.engine.cancel_deposit(&ctx.admin, deposit.id).await.unwrap();

    assert_eq!(cancelled.status, DepositStatus::Cancelled);
    assert!(matches!(
        ctx.engine.confirm_deposit(&ctx.admin, deposit.id).await,
        Err(AppError::InvalidState(_))
    ));
    assert_eq!(ctx.balance(&user).await, dec!(0));
    assert!(ctx.engine.list_my_transactions(&user, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn deposit_submission_validates_input() {
    let ctx = common::setup().await;
    let user = ctx.user("erin").await;
    let other = ctx.user("frank").await;

    let below_minimum = ctx.engine.submit_deposit(&user, user.account_id, dec!(0.0001), "h").await;
    assert!(matches!(below_minimum, Err(AppError::InvalidInput(_))));

    let blank_hash = ctx.engine.submit_deposit(&user, user.account_id, dec!(0.01), "  ").await;
    assert!(matches!(blank_hash, Err(AppError::InvalidInput(_))));

    let too_precise = ctx.engine.submit_deposit(
        &user,
        user.account_id,
        dec!(0.010000001),
        "h"
    ).await;
    assert!(matches!(too_precise, Err(AppError::InvalidInput(_))));

    let for_someone_else = ctx.engine.submit_deposit(&user, other.account_id, dec!(0.01), "h").await;
    assert!(matches!(for_someone_else, Err(AppError::Forbidden(_))));

    assert!(ctx.engine.list_my_deposits(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn withdrawal_lifecycle_debits_on_send() {
    let ctx = common::setup().await;
    let user = ctx.user("grace").await;
    ctx.fund(&user, dec!(0.05)).await;

    let withdrawal = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.02), "bc1qgrace").await
        .unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
    assert_eq!(ctx.balance(&user).await, dec!(0.05));

    let approved = ctx.engine.approve_withdrawal(&ctx.admin, withdrawal.id).await.unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Approved);
    assert_eq!(approved.approved_by, Some(ctx.admin.account_id));
    assert_eq!(ctx.balance(&user).await, dec!(0.05));

    let payout = ctx.engine
        .mark_withdrawal_sent(&ctx.admin, withdrawal.id, "txout1").await
        .unwrap();
    assert_eq!(payout.withdrawal.status, WithdrawalStatus::Sent);
    assert_eq!(payout.withdrawal.tx_hash.as_deref(), Some("txout1"));
    assert_eq!(payout.account.balance, dec!(0.03));
    assert_eq!(payout.transaction.tx_type, TransactionType::Withdrawal);
    assert_eq!(payout.transaction.amount, dec!(-0.02));
    assert_eq!(payout.transaction.notes, "Withdrawal sent: txout1 to bc1qgrace");

    let again = ctx.engine.approve_withdrawal(&ctx.admin, withdrawal.id).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));
    let resend = ctx.engine.mark_withdrawal_sent(&ctx.admin, withdrawal.id, "txout2").await;
    assert!(matches!(resend, Err(AppError::InvalidState(_))));

    assert_eq!(ctx.balance(&user).await, dec!(0.03));
}

#[tokio::test]
async fn withdrawal_request_checks_balance_and_limits() {
    let ctx = common::setup().await;
    let user = ctx.user("heidi").await;
    ctx.fund(&user, dec!(0.01)).await;

    let too_much = ctx.engine.request_withdrawal(&user, user.account_id, dec!(0.02), "addr").await;
    assert!(matches!(too_much, Err(AppError::InsufficientBalance)));

    let below_min = ctx.engine.request_withdrawal(&user, user.account_id, dec!(0.0005), "addr").await;
    assert!(matches!(below_min, Err(AppError::InvalidInput(_))));

    let above_max = ctx.engine.request_withdrawal(&user, user.account_id, dec!(101), "addr").await;
    assert!(matches!(above_max, Err(AppError::InvalidInput(_))));

    let no_address = ctx.engine.request_withdrawal(&user, user.account_id, dec!(0.005), " ").await;
    assert!(matches!(no_address, Err(AppError::InvalidInput(_))));

    assert!(ctx.engine.list_my_withdrawals(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_withdrawal_cannot_be_approved() {
    let ctx = common::setup().await;
    let user = ctx.user("ivan").await;
    ctx.fund(&user, dec!(0.01)).await;

    let pending = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.005), "addr").await
        .unwrap();
    let rejected = ctx.engine.reject_withdrawal(&ctx.admin, pending.id).await.unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Cancelled);

    let approve = ctx.engine.approve_withdrawal(&ctx.admin, pending.id).await;
    assert!(matches!(approve, Err(AppError::InvalidState(_))));

    let approved = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.005), "addr").await
        .unwrap();
    ctx.engine.approve_withdrawal(&ctx.admin, approved.id).await.unwrap();
    let rejected = ctx.engine.reject_withdrawal(&ctx.admin, approved.id).await.unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Cancelled);

    assert_eq!(ctx.balance(&user).await, dec!(0.01));
}

#[tokio::test]
async fn send_fails_when_balance_was_drained() {
    let ctx = common::setup().await;
    let user = ctx.user("judy").await;
    ctx.fund(&user, dec!(0.01)).await;

    let first = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.008), "addr").await
        .unwrap();
    let second = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.008), "addr").await
        .unwrap();
    ctx.engine.approve_withdrawal(&ctx.admin, first.id).await.unwrap();
    ctx.engine.approve_withdrawal(&ctx.admin, second.id).await.unwrap();

    ctx.engine.mark_withdrawal_sent(&ctx.admin, first.id, "tx-a").await.unwrap();
    let result = ctx.engine.mark_withdrawal_sent(&ctx.admin, second.id, "tx-b").await;
    assert!(matches!(result, Err(AppError::InsufficientBalance)));

    let still_approved = ctx.engine.get_withdrawal(&user, second.id).await.unwrap();
    assert_eq!(still_approved.status, WithdrawalStatus::Approved);
    assert_eq!(ctx.balance(&user).await, dec!(0.002));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queued_debits_never_overdraw() {
    let ctx = common::setup().await;
    let user = ctx.user("mallory").await;
    ctx.fund(&user, dec!(0.0000001)).await;

    let debit = |engine: std::sync::Arc<custody_ledger::LedgerEngine>| {
        let admin = ctx.admin;
        let account_id = user.account_id;
        tokio::spawn(async move {
            engine.adjust_balance(
                &admin,
                account_id,
                dec!(0.0000001),
                AdjustmentDirection::Debit,
                None
            ).await
        })
    };

    let first = debit(ctx.engine.clone());
    let second = debit(ctx.engine.clone());
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(AppError::InsufficientBalance))));
    assert_eq!(ctx.balance(&user).await, dec!(0));

    let report = ctx.engine.reconcile(&ctx.admin, user.account_id).await.unwrap();
    assert!(report.balanced);
    assert_eq!(report.entries, 2);
}

#[tokio::test]
async fn reconcile_matches_ledger_after_mixed_activity() {
    let ctx = common::setup().await;
    let user = ctx.user("niaj").await;
    ctx.fund(&user, dec!(0.5)).await;

    let deposit = ctx.engine
        .submit_deposit(&user, user.account_id, dec!(0.25), "dep-1").await
        .unwrap();
    ctx.engine.confirm_deposit(&ctx.admin, deposit.id).await.unwrap();

    let withdrawal = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.3), "addr").await
        .unwrap();
    ctx.engine.approve_withdrawal(&ctx.admin, withdrawal.id).await.unwrap();
    ctx.engine.mark_withdrawal_sent(&ctx.admin, withdrawal.id, "out-1").await.unwrap();

    let report = ctx.engine.reconcile(&ctx.admin, user.account_id).await.unwrap();

    assert!(report.balanced);
    assert_eq!(report.balance, dec!(0.45));
    assert_eq!(report.ledger_sum, dec!(0.45));
    assert_eq!(report.entries, 3);
}

#[tokio::test]
async fn non_admins_cannot_run_admin_operations() {
    let ctx = common::setup().await;
    let user = ctx.user("oscar").await;
    ctx.fund(&user, dec!(0.01)).await;

    let deposit = ctx.engine
        .submit_deposit(&user, user.account_id, dec!(0.01), "h").await
        .unwrap();
    let withdrawal = ctx.engine
        .request_withdrawal(&user, user.account_id, dec!(0.005), "addr").await
        .unwrap();

    assert!(matches!(
        ctx.engine.confirm_deposit(&user, deposit.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ctx.engine.approve_withdrawal(&user, withdrawal.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ctx.engine.adjust_balance(
            &user,
            user.account_id,
            dec!(1),
            AdjustmentDirection::Credit,
            None
        ).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ctx.engine.reconcile(&user, user.account_id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(ctx.engine.list_deposits(&user).await, Err(AppError::Forbidden(_))));

    assert_eq!(ctx.balance(&user).await, dec!(0.01));
}

#[tokio::test]
async fn users_only_see_their_own_records() {
    let ctx = common::setup().await;
    let owner = ctx.user("peggy").await;
    let stranger = ctx.user("trent").await;

    let deposit = ctx.engine
        .submit_deposit(&owner, owner.account_id, dec!(0.01), "h").await
        .unwrap();

    assert!(ctx.engine.get_deposit(&owner, deposit.id).await.is_ok());
    assert!(ctx.engine.get_deposit(&ctx.admin, deposit.id).await.is_ok());
    assert!(matches!(
        ctx.engine.get_deposit(&stranger, deposit.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(ctx.engine.list_my_deposits(&stranger).await.unwrap().is_empty());

    let all = ctx.engine.list_deposits(&ctx.admin).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].user.as_ref().map(|u| u.username.as_str()), Some("peggy"));
}

#[tokio::test]
async fn operations_on_missing_records_report_not_found() {
    let ctx = common::setup().await;
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        ctx.engine.confirm_deposit(&ctx.admin, missing).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ctx.engine.approve_withdrawal(&ctx.admin, missing).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ctx.engine.adjust_balance(
            &ctx.admin,
            missing,
            dec!(1),
            AdjustmentDirection::Credit,
            None
        ).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ctx.engine.resolve_caller(missing).await,
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn settings_update_changes_enforced_limits() {
    let ctx = common::setup().await;
    let user = ctx.user("victor").await;
    ctx.fund(&user, dec!(1)).await;

    let settings = ctx.engine.get_settings(&ctx.admin).await.unwrap();
    assert_eq!(settings.min_deposit, dec!(0.001));
    assert_eq!(settings.max_withdrawal, dec!(100));

    let updated = ctx.engine
        .update_settings(&ctx.admin, custody_ledger::db::PlatformConfigInput {
            max_withdrawal: Some(dec!(0.1)),
            deposit_address: Some("bc1qplatform".to_string()),
            ..Default::default()
        }).await
        .unwrap();
    assert_eq!(updated.max_withdrawal, dec!(0.1));
    assert_eq!(updated.deposit_address, "bc1qplatform");
    assert_eq!(updated.min_deposit, dec!(0.001));

    let over = ctx.engine.request_withdrawal(&user, user.account_id, dec!(0.2), "addr").await;
    assert!(matches!(over, Err(AppError::InvalidInput(_))));

    let inverted = ctx.engine.update_settings(&ctx.admin, custody_ledger::db::PlatformConfigInput {
        min_withdrawal: Some(dec!(0.5)),
        ..Default::default()
    }).await;
    assert!(matches!(inverted, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn duplicate_identity_is_rejected() {
    let ctx = common::setup().await;
    ctx.user("wendy").await;

    let duplicate = ctx.engine.create_account(
        &ctx.admin,
        "WENDY@example.com",
        "wendy2",
        false
    ).await;

    assert!(matches!(duplicate, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn account_reads_respect_ownership() {
    let ctx = common::setup().await;
    let user = ctx.user("xavier").await;
    let other = ctx.user("yolanda").await;

    assert!(ctx.engine.get_account(&user, user.account_id).await.is_ok());
    assert!(ctx.engine.get_account(&ctx.admin, user.account_id).await.is_ok());
    assert!(matches!(
        ctx.engine.get_account(&user, other.account_id).await,
        Err(AppError::Forbidden(_))
    ));

    let accounts = ctx.engine.list_accounts(&ctx.admin).await.unwrap();
    assert_eq!(accounts.len(), 3);
    assert!(matches!(ctx.engine.list_accounts(&user).await, Err(AppError::Forbidden(_))));

    let renamed = ctx.engine.update_username(&user, " xav ").await.unwrap();
    assert_eq!(renamed.username, "xav");
    assert!(matches!(
        ctx.engine.update_username(&user, "yolanda").await,
        Err(AppError::InvalidInput(_))
    ));
}
