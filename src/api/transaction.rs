use axum::{ extract::{ Path, Query, State }, Json };
use serde::Deserialize;
use uuid::Uuid;

use crate::caller::Caller;
use crate::db::entity::transaction;
use crate::error::Result;

use super::AppState;

#[derive(Deserialize)]
pub struct TransactionQueryParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn list_my_transactions(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<TransactionQueryParams>
) -> Result<Json<Vec<transaction::Model>>> {
    let transactions = state.engine.list_my_transactions(
        &caller,
        params.limit,
        params.offset
    ).await?;

    Ok(Json(transactions))
}

pub async fn list_account_transactions(
    State(state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>,
    Query(params): Query<TransactionQueryParams>
) -> Result<Json<Vec<transaction::Model>>> {
    let transactions = state.engine.list_transactions(
        &caller,
        account_id,
        params.limit,
        params.offset
    ).await?;

    Ok(Json(transactions))
}
