use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use stack_auth::AuthError;
use stack_store::StoreError;
use stack_types::api::ErrorResponse;

/// A status code plus a short message the client can show inline.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::not_found(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidEmail | AuthError::InvalidCode | AuthError::MissingToken => {
                Self::bad_request(e.to_string())
            }
            AuthError::Token(_) => Self::new(StatusCode::UNAUTHORIZED, e.to_string()),
            AuthError::NotConfigured(_) => {
                error!("{}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
            }
            AuthError::Http(_) | AuthError::Malformed(_) => {
                error!("{}", e);
                Self::new(StatusCode::BAD_GATEWAY, "Verification service unavailable")
            }
        }
    }
}
