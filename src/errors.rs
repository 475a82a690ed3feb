use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Rejections raised while validating a dashboard request, before any provider is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid date format or range: {0}")]
    InvalidDate(String),
    #[error("Invalid date format or range: Start date must be before end date.")]
    StartNotBeforeEnd,
    #[error("Please select at least one stock.")]
    NoTickers,
    #[error("Please select a maximum of {max} stocks.")]
    TooManyTickers { max: usize, requested: usize },
}
