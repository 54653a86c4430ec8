pub mod auth;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod middleware;
pub mod search;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use stack_auth::{RecaptchaVerifier, SendGridMailer, VerificationService};
use stack_client::transport::MockTransport;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub transport: MockTransport,
    pub auth: VerificationService<SendGridMailer>,
    pub recaptcha: RecaptchaVerifier,
}

/// All routes, without transport-level layers (CORS, tracing).
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users", get(messages::list_users))
        .route("/channels", get(messages::list_channels))
        .route("/channels/{channel_id}/messages", get(messages::get_messages))
        .route("/channels/{channel_id}/summary", get(messages::get_summary))
        .route("/search", get(search::search))
        .route("/search/suggest", get(search::suggest))
        .route("/auth/code", post(auth::send_code))
        .route("/auth/verify", post(auth::verify_code))
        .route("/auth/recaptcha", post(auth::verify_recaptcha))
        .route("/gateway", get(gateway::ws_upgrade));

    let protected_routes = Router::new()
        .route("/channels/{channel_id}/messages", post(messages::send_message))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, Response};
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use stack_client::replies::ReplyRules;
    use stack_client::transport::Latency;
    use stack_store::MemoryStore;

    pub const SECRET: &str = "test-secret";

    pub fn state() -> AppState {
        let store = Arc::new(MemoryStore::seeded());
        Arc::new(AppStateInner {
            transport: MockTransport::new(store, Latency::none(), ReplyRules::new()),
            auth: VerificationService::new(
                SendGridMailer::new(None, "no-reply@stack.local".into(), "Stack".into()),
                SECRET,
            ),
            recaptcha: RecaptchaVerifier::new(None),
        })
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
        router(state.clone()).oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub async fn json<T: DeserializeOwned>(response: Response<Body>) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
