use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::info;

use stack_auth::BotVerifier;
use stack_types::api::{
    RecaptchaRequest, SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse,
};

use crate::AppState;
use crate::error::ApiError;

pub async fn send_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Sign-in code requested for {}", req.email);
    let sent = state.auth.send_code(&req.email).await?;

    Ok(Json(SendCodeResponse {
        success: true,
        code: sent.code,
    }))
}

pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.verify(&req.email, &req.code)?;

    Ok(Json(VerifyCodeResponse {
        email: session.email,
        token: session.token,
    }))
}

pub async fn verify_recaptcha(
    State(state): State<AppState>,
    Json(req): Json<RecaptchaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.recaptcha.verify(&req.token).await? {
        return Err(ApiError::bad_request("reCAPTCHA verification failed"));
    }
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use stack_auth::session::decode_session;
    use stack_types::api::{ErrorResponse, SendCodeResponse, VerifyCodeResponse};

    use crate::test_support::*;

    #[tokio::test]
    async fn undelivered_code_still_signs_in() {
        let state = state();

        // No mail provider is configured in tests, so the code comes back
        let response = send(&state, post_json("/auth/code", json!({ "email": "alice@example.com" }), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let sent: SendCodeResponse = json(response).await;
        assert!(sent.success);
        let code = sent.code.unwrap();

        let request = post_json("/auth/verify", json!({ "email": "alice@example.com", "code": code }), None);
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let verified: VerifyCodeResponse = json(response).await;
        assert_eq!(decode_session(SECRET, &verified.token).unwrap().sub, "alice@example.com");
    }

    #[tokio::test]
    async fn bad_code_and_bad_email() {
        let state = state();

        let request = post_json("/auth/verify", json!({ "email": "bob@example.com", "code": "000000" }), None);
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.error, "Invalid or expired code");

        let response = send(&state, post_json("/auth/code", json!({ "email": "bob" }), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recaptcha_errors() {
        let state = state();

        let response = send(&state, post_json("/auth/recaptcha", json!({ "token": "" }), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // No secret configured in tests
        let response = send(&state, post_json("/auth/recaptcha", json!({ "token": "abc" }), None)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.error, "Server configuration error");
    }
}
