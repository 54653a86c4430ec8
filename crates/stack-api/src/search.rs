use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use stack_types::api::SearchCriteria;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub query: String,
}

/// `GET /search?query=..&from=..&in=..&sort=relevant|newest|oldest`
pub async fn search(
    State(state): State<AppState>,
    Query(criteria): Query<SearchCriteria>,
) -> impl IntoResponse {
    Json(state.transport.search(&criteria).await)
}

pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> impl IntoResponse {
    Json(state.transport.suggest(&query.query).await)
}
