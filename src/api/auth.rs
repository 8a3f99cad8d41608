use axum::{ extract::FromRequestParts, http::request::Parts };
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::AppError;

use super::AppState;

/// Set by the upstream authentication layer once the session is verified.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState
    ) -> Result<Self, Self::Rejection> {
        let account_id = parts.headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or(AppError::Unauthorized)?;

        state.engine.resolve_caller(account_id).await
    }
}
