//! Axum route handlers for the Portfolio API.

use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::models::Pagination;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub is_published: bool,
}

/// GET /portfolios/
pub async fn handle_list_portfolios(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Portfolio>>, AppError> {
    Ok(Json(state.portfolios.list(&user.id, page).await?))
}

/// GET /portfolios/:id
pub async fn handle_get_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Portfolio>, AppError> {
    state
        .portfolios
        .get(&user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /portfolios/
pub async fn handle_create_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PortfolioCreate>,
) -> Result<Json<Portfolio>, AppError> {
    state
        .portfolios
        .insert(&user.id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Internal(anyhow!("Failed to create portfolio")))
}

/// PUT /portfolios/:id
pub async fn handle_update_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PortfolioUpdate>,
) -> Result<Json<Portfolio>, AppError> {
    if req.is_empty() {
        return Err(AppError::BadInput("No fields to update".to_string()));
    }
    state
        .portfolios
        .update(&user.id, id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /portfolios/:id
pub async fn handle_delete_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.portfolios.delete(&user.id, id).await? {
        return Err(not_found(id));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Portfolio deleted successfully"
    })))
}

/// PATCH /portfolios/:id/publish
///
/// Read-then-write with no concurrency guard: two concurrent toggles can both
/// read the same flag, and the last write wins.
pub async fn handle_toggle_publish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublishResponse>, AppError> {
    let current = state
        .portfolios
        .get(&user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let updated = state
        .portfolios
        .set_published(&user.id, id, !current.is_published)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(PublishResponse {
        success: true,
        is_published: updated.is_published,
    }))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Portfolio {id} not found"))
}
