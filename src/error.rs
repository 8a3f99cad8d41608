use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Not found: {0}")] NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")] Forbidden(String),

    #[error("Invalid state: {0}")] InvalidState(String),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "INTERNAL_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let message = match self {
            // Store failures stay in the logs.
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::InvalidState(msg) => msg.clone(),
            AppError::InsufficientBalance => "Insufficient balance".to_string(),
            AppError::Config(msg) => msg.clone(),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidInput(_) | AppError::InsufficientBalance => {
                axum::http::StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            AppError::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => axum::http::StatusCode::FORBIDDEN,
            AppError::InvalidState(_) => axum::http::StatusCode::CONFLICT,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
