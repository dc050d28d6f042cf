//! Axum route handlers for the caller's profile.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileFields};
use crate::state::AppState;

/// GET /profiles/me
///
/// `null` when the caller has no profile yet.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Option<Profile>>, AppError> {
    Ok(Json(state.profiles.get(&user.id).await?))
}

/// POST /profiles/me
pub async fn handle_create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .insert(&user.id, &user.email, &fields)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::BadInput("Profile already exists. Use PUT to update.".to_string()))
}

/// PUT /profiles/me
///
/// Creates the profile when absent, otherwise updates
/// only the fields present in the body.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<Profile>, AppError> {
    if state.profiles.get(&user.id).await?.is_none() {
        // A concurrent create can win the insert; fall through to the update.
        if let Some(profile) = state.profiles.insert(&user.id, &user.email, &fields).await? {
            return Ok(Json(profile));
        }
    }

    if fields.is_empty() {
        return Err(AppError::BadInput("No fields to update".to_string()));
    }

    state
        .profiles
        .update(&user.id, &fields)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// DELETE /profiles/me
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    state.profiles.delete(&user.id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile deleted successfully"
    })))
}
