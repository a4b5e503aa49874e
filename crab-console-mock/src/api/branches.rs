use super::guard;
use crate::state::AppState;
use axum::{Json, extract::State, http::HeaderMap};
use shared::error::AppResult;
use shared::models::Branch;
use std::sync::Arc;

/// GET /admin/branches
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Branch>>> {
    guard(&state, &headers)?;
    Ok(Json(state.store.read().await.branches()))
}
