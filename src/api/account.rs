use axum::{ extract::State, http::StatusCode, Json };
use serde::Deserialize;

use crate::caller::Caller;
use crate::db::entity::account;
use crate::error::Result;
use crate::services::InitOutcome;

use super::AppState;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

pub async fn init(State(state): State<AppState>) -> Result<Json<InitOutcome>> {
    let outcome = state.engine.init().await?;

    Ok(Json(outcome))
}

pub async fn get_profile(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<account::Model>> {
    let account = state.engine.get_profile(&caller).await?;

    Ok(Json(account))
}

pub async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<UpdateProfileRequest>
) -> Result<Json<account::Model>> {
    let account = state.engine.update_username(&caller, &request.username).await?;

    Ok(Json(account))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    caller: Caller
) -> Result<Json<Vec<account::Model>>> {
    let accounts = state.engine.list_accounts(&caller).await?;

    Ok(Json(accounts))
}

pub async fn create_account(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateAccountRequest>
) -> Result<(StatusCode, Json<account::Model>)> {
    let account = state.engine.create_account(
        &caller,
        &request.email,
        &request.username,
        request.is_admin
    ).await?;

    Ok((StatusCode::CREATED, Json(account)))
}
