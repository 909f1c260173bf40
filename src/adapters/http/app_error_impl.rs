use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

const GENERIC_SERVER_ERROR: &str = "An unexpected error occurred. Please try again.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail goes to the log only; server-side bodies stay generic.
        if self.is_client_error() {
            tracing::debug!(error = ?self, "Request rejected");
        } else {
            tracing::error!(error = ?self, "Request failed");
        }

        match self {
            AppError::Database(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                GENERIC_SERVER_ERROR,
                None,
            ),
            AppError::RateLimited => error_resp(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorCode::RateLimited,
                "Too many requests. Please try again later.",
                None,
            ),
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, &msg, None)
            }
            AppError::Validation(details) => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidInput,
                "Invalid data provided",
                Some(json!(details)),
            ),
            AppError::Conflict(msg) => {
                error_resp(StatusCode::CONFLICT, ErrorCode::Conflict, &msg, None)
            }
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not found", None)
            }
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                GENERIC_SERVER_ERROR,
                None,
            ),
        }
    }
}

fn error_resp(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
    details: Option<Value>,
) -> Response {
    let body = match details {
        Some(details) => json!({ "code": code.as_str(), "error": message, "details": details }),
        None => json!({ "code": code.as_str(), "error": message }),
    };
    (status, Json(body)).into_response()
}
