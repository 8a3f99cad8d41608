use std::sync::Arc;

use axum::{ routing::{ get, post }, Router };
use tower_http::{ cors::CorsLayer, trace::TraceLayer };

pub mod auth;
pub mod account;
pub mod balance;
pub mod config;
pub mod deposit;
pub mod transaction;
pub mod withdrawal;

use crate::services::LedgerEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LedgerEngine>,
}

impl AppState {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/init", post(account::init))
        .route("/api/user", get(account::get_profile).put(account::update_profile))
        .route("/api/deposits", get(deposit::list_my_deposits).post(deposit::submit_deposit))
        .route(
            "/api/withdrawals",
            get(withdrawal::list_my_withdrawals).post(withdrawal::request_withdrawal)
        )
        .route("/api/transactions", get(transaction::list_my_transactions))
        .route("/api/admin/users", get(account::list_accounts).post(account::create_account))
        .route(
            "/api/admin/users/{id}/transactions",
            get(transaction::list_account_transactions)
        )
        .route("/api/admin/balance", post(balance::adjust_balance))
        .route("/api/admin/reconcile/{id}", get(balance::reconcile))
        .route("/api/admin/deposits", get(deposit::list_deposits).put(deposit::update_deposit))
        .route(
            "/api/admin/withdrawals",
            get(withdrawal::list_withdrawals).put(withdrawal::update_withdrawal)
        )
        .route("/api/admin/config", get(config::get_config).put(config::update_config))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}
