use axum::{ extract::{ Path, State }, http::StatusCode, Json };
use sea_orm::prelude::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::caller::Caller;
use crate::enums::AdjustmentDirection;
use crate::error::Result;
use crate::services::{ Adjustment, Reconciliation };

use super::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalanceRequest {
    pub user_id: Uuid,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub direction: AdjustmentDirection,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn adjust_balance(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<AdjustBalanceRequest>
) -> Result<(StatusCode, Json<Adjustment>)> {
    let adjustment = state.engine.adjust_balance(
        &caller,
        request.user_id,
        request.amount,
        request.direction,
        request.notes.as_deref()
    ).await?;

    Ok((StatusCode::CREATED, Json(adjustment)))
}

pub async fn reconcile(
    State(state): State<AppState>,
    caller: Caller,
    Path(account_id): Path<Uuid>
) -> Result<Json<Reconciliation>> {
    let reconciliation = state.engine.reconcile(&caller, account_id).await?;

    Ok(Json(reconciliation))
}
