//! Admin API router

mod branches;
mod scan;
mod tables;

use crate::state::AppState;
use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use shared::error::{AppError, AppResult, ErrorCode};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/branches", get(branches::list))
        .route("/tables", get(tables::list).post(tables::create))
        .route("/tables/{id}", put(tables::update).delete(tables::delete))
        .route("/tables/{id}/regenerate", post(tables::regenerate));

    Router::new()
        .nest("/admin", admin)
        .route("/menu/scan/{token}", get(scan::resolve))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bearer check plus the one-shot injected failure
fn guard(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    if let Some(expected) = &state.api_token {
        let presented = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));
        match presented {
            None => return Err(AppError::not_authenticated()),
            Some(token) if token != expected => {
                return Err(AppError::new(ErrorCode::TokenInvalid));
            }
            Some(_) => {}
        }
    }
    match state.take_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
