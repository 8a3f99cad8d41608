use axum::{ extract::State, http::StatusCode, Json };
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::caller::Caller;
use crate::db::entity::deposit;
use crate::error::Result;
use crate::services::{ DepositConfirmation, DepositView };

use super::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDepositRequest {
    pub amount: Decimal,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositAction {
    Confirm,
    Cancel,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepositRequest {
    pub deposit_id: Uuid,
    pub action: DepositAction,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum UpdateDepositResponse {
    Confirmed(DepositConfirmation),
    Cancelled(deposit::Model),
}

pub async fn submit_deposit(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<SubmitDepositRequest>
) -> Result<(StatusCode, Json<deposit::Model>)> {
    let deposit = state.engine.submit_deposit(
        &caller,
        caller.account_id,
        request.amount,
        &request.tx_hash
    ).await?;

    Ok((StatusCode::CREATED, Json(deposit)))
}

pub async fn list_my_deposits(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<Vec<deposit::Model>>> {
    let deposits = state.engine.list_my_deposits(&caller).await?;

    Ok(Json(deposits))
}

pub async fn list_deposits(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<Vec<DepositView>>> {
    let deposits = state.engine.list_deposits(&caller).await?;

    Ok(Json(deposits))
}

pub async fn update_deposit(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<UpdateDepositRequest>
) -> Result<Json<UpdateDepositResponse>> {
    let response = match request.action {
        DepositAction::Confirm => {
            UpdateDepositResponse::Confirmed(
                state.engine.confirm_deposit(&caller, request.deposit_id).await?
            )
        }
        DepositAction::Cancel => {
            UpdateDepositResponse::Cancelled(
                state.engine.cancel_deposit(&caller, request.deposit_id).await?
            )
        }
    };

    Ok(Json(response))
}
