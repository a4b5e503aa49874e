use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;
use shared::models::DiningTable;
use std::sync::Arc;

/// GET /menu/scan/{token} - what a customer's phone hits after scanning
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let table = state.store.read().await.resolve(&token)?;
    Ok(Json(table))
}
