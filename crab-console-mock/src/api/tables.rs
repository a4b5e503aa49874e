//! Dining table handlers

use super::guard;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use shared::error::AppResult;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableListQuery};
use std::sync::Arc;

/// GET /admin/tables?branch_id={id}
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TableListQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    guard(&state, &headers)?;
    let tables = state.store.read().await.tables_for(query.branch_id)?;
    Ok(Json(tables))
}

/// POST /admin/tables
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    guard(&state, &headers)?;
    let table = state.store.write().await.create_table(payload)?;
    tracing::info!(table_id = table.id, branch_id = table.branch_id, "table created");
    Ok(Json(table))
}

/// PUT /admin/tables/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    guard(&state, &headers)?;
    let table = state.store.write().await.rename_table(id, payload)?;
    tracing::info!(table_id = id, "table renamed");
    Ok(Json(table))
}

/// POST /admin/tables/{id}/regenerate
pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    guard(&state, &headers)?;
    let table = state.store.write().await.regenerate(id)?;
    tracing::info!(table_id = id, "table token regenerated");
    Ok(Json(table))
}

/// DELETE /admin/tables/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    guard(&state, &headers)?;
    state.store.write().await.delete_table(id)?;
    tracing::info!(table_id = id, "table deleted");
    Ok(StatusCode::NO_CONTENT)
}
