use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use stack_auth::Claims;
use stack_types::api::SendMessageRequest;
use stack_types::models::MessageDraft;

use crate::AppState;
use crate::error::ApiError;

pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.transport.users().await)
}

/// Named channels followed by one direct-message channel per teammate.
pub async fn list_channels(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.transport.channels().await)
}

/// Unknown channels yield an empty list, not an error.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> impl IntoResponse {
    Json(state.transport.fetch_messages(&channel_id).await)
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .transport
        .fetch_summary(&channel_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No summary available for this channel."))
}

/// Posts as the workspace's current user; the session only gates access.
pub async fn send_message(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    let draft = MessageDraft {
        user_id: state.transport.current_user_id().to_string(),
        channel_id,
        content: content.to_string(),
    };

    let message = state.transport.post_message(draft).await?;
    debug!("{} posted {} in {}", claims.sub, message.id, message.channel_id);

    Ok((StatusCode::CREATED, Json(message)))
}
