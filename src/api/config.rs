use axum::{ extract::State, Json };
use sea_orm::prelude::Decimal;
use serde::Deserialize;

use crate::caller::Caller;
use crate::db::PlatformConfigInput;
use crate::error::Result;
use crate::services::PlatformSettings;

use super::AppState;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub deposit_address: Option<String>,
    pub admin_wallet: Option<String>,
    pub min_deposit: Option<Decimal>,
    pub min_withdrawal: Option<Decimal>,
    pub max_withdrawal: Option<Decimal>,
}

impl From<UpdateConfigRequest> for PlatformConfigInput {
    fn from(request: UpdateConfigRequest) -> Self {
        Self {
            deposit_address: request.deposit_address,
            admin_wallet: request.admin_wallet,
            min_deposit: request.min_deposit,
            min_withdrawal: request.min_withdrawal,
            max_withdrawal: request.max_withdrawal,
        }
    }
}

pub async fn get_config(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<PlatformSettings>> {
    let settings = state.engine.get_settings(&caller).await?;

    Ok(Json(settings))
}

pub async fn update_config(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<UpdateConfigRequest>
) -> Result<Json<PlatformSettings>> {
    let settings = state.engine.update_settings(&caller, request.into()).await?;

    Ok(Json(settings))
}
