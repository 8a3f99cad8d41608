use axum::{ extract::State, http::StatusCode, Json };
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::caller::Caller;
use crate::db::entity::withdrawal;
use crate::error::{ AppError, Result };
use crate::services::{ WithdrawalPayout, WithdrawalView };

use super::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithdrawalRequest {
    pub amount: Decimal,
    pub wallet_address: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalAction {
    Approve,
    Sent,
    Reject,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWithdrawalRequest {
    pub withdrawal_id: Uuid,
    pub action: WithdrawalAction,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum UpdateWithdrawalResponse {
    Sent(WithdrawalPayout),
    Updated(withdrawal::Model),
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<RequestWithdrawalRequest>
) -> Result<(StatusCode, Json<withdrawal::Model>)> {
    let withdrawal = state.engine.request_withdrawal(
        &caller,
        caller.account_id,
        request.amount,
        &request.wallet_address
    ).await?;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn list_my_withdrawals(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<Vec<withdrawal::Model>>> {
    let withdrawals = state.engine.list_my_withdrawals(&caller).await?;

    Ok(Json(withdrawals))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<Vec<WithdrawalView>>> {
    let withdrawals = state.engine.list_withdrawals(&caller).await?;

    Ok(Json(withdrawals))
}

pub async fn update_withdrawal(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<UpdateWithdrawalRequest>
) -> Result<Json<UpdateWithdrawalResponse>> {
    let id = request.withdrawal_id;

    let response = match request.action {
        WithdrawalAction::Approve => {
            UpdateWithdrawalResponse::Updated(state.engine.approve_withdrawal(&caller, id).await?)
        }
        WithdrawalAction::Sent => {
            let tx_hash = request.tx_hash.ok_or_else(||
                AppError::InvalidInput("Transaction hash required".to_string())
            )?;
            UpdateWithdrawalResponse::Sent(
                state.engine.mark_withdrawal_sent(&caller, id, &tx_hash).await?
            )
        }
        WithdrawalAction::Reject => {
            UpdateWithdrawalResponse::Updated(state.engine.reject_withdrawal(&caller, id).await?)
        }
    };

    Ok(Json(response))
}
