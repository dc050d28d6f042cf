//! Axum route handlers for the caller's user record and profile picture.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::{User, UserUpdate};
use crate::state::AppState;
use crate::storage::profile_picture_path;
use crate::upload::read_file_field;

const IMAGE_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// GET /users/
///
/// The row is created from the token's identity on first request.
pub async fn handle_get_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.provision(&user.id, &user.email).await?))
}

/// PATCH /users/
pub async fn handle_update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    if req.is_empty() {
        return Err(AppError::BadInput("No fields to update".to_string()));
    }
    state.users.provision(&user.id, &user.email).await?;
    state
        .users
        .update(&user.id, &req)
        .await?
        .map(Json)
        .ok_or_else(user_not_found)
}

/// POST /users/pfp
///
/// Overwrites any previous picture.
pub async fn handle_upload_profile_picture(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let upload = read_file_field(multipart).await?;
    let content_type = upload
        .content_type
        .as_deref()
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| IMAGE_CONTENT_TYPES.contains(&ct.as_str()))
        .ok_or_else(|| {
            AppError::BadInput(
                "Unsupported file type. Please upload a JPEG or PNG image.".to_string(),
            )
        })?;

    let path = profile_picture_path(&user.id);
    state.files.put(&path, upload.bytes, &content_type).await?;
    info!(user_id = %user.id, "Profile picture stored");

    Ok(Json(json!({ "success": true, "path": path })))
}

/// GET /users/pfp
pub async fn handle_get_profile_picture(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let object = state
        .files
        .get(&profile_picture_path(&user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("Profile picture not found".to_string()))?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| IMAGE_CONTENT_TYPES[0].to_string());
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        object.bytes,
    ))
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}
