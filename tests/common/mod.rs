#![allow(dead_code)]

use std::sync::Arc;

use custody_ledger::{ config::BootstrapConfig, AdjustmentDirection, Caller, LedgerEngine };
use rust_decimal::Decimal;
use sea_orm::{ ConnectOptions, Database, DatabaseConnection };
use sea_orm_migration::MigratorTrait;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub engine: Arc<LedgerEngine>,
    pub admin: Caller,
}

impl TestContext {
    /// Creates a non-admin account and returns it as a caller.
    pub async fn user(&self, name: &str) -> Caller {
        let account = self.engine
            .create_account(&self.admin, &format!("{}@example.com", name), name, false).await
            .expect("create user");
        Caller::user(account.id)
    }

    /// Funds an account through an admin credit.
    pub async fn fund(&self, user: &Caller, amount: Decimal) {
        self.engine
            .adjust_balance(
                &self.admin,
                user.account_id,
                amount,
                AdjustmentDirection::Credit,
                Some("test funding")
            ).await
            .expect("fund user");
    }

    pub async fn balance(&self, user: &Caller) -> Decimal {
        self.engine.get_profile(user).await.expect("profile").balance
    }
}

/// Fresh in-memory store. A single pooled connection keeps the database alive
/// for the whole test and serializes transactions; row-lock contention is
/// covered by `tests/contention.rs` against Postgres.
pub async fn fresh_engine() -> (DatabaseConnection, Arc<LedgerEngine>) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    migration::Migrator::up(&db, None).await.expect("run migrations");

    let engine = Arc::new(LedgerEngine::new(db.clone(), BootstrapConfig::default()));
    (db, engine)
}

/// Fresh store with the bootstrap admin and settings seeded.
pub async fn setup() -> TestContext {
    let (db, engine) = fresh_engine().await;
    let outcome = engine.init().await.expect("init");

    TestContext {
        db,
        engine,
        admin: Caller::admin(outcome.admin.id),
    }
}
