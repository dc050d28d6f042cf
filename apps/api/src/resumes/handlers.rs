//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::models::Pagination;
use crate::resumes::ingest::{ingest_resume, IngestDeps};
use crate::state::AppState;
use crate::upload::read_file_field;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /resumes/
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.resumes.list(&user.id, page).await?))
}

/// POST /resumes/
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let upload = read_file_field(multipart).await?;
    let deps = IngestDeps {
        files: state.files.as_ref(),
        resumes: state.resumes.as_ref(),
        llm: state.llm.as_ref(),
    };
    let resume = ingest_resume(deps, &user.id, upload).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(find_owned(&state, &user, id).await?))
}

/// GET /resumes/:id/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resume = find_owned(&state, &user, id).await?;
    let object = state
        .files
        .get(&resume.file_path)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume file not found".to_string()))?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_filename(&resume.title)
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        object.bytes,
    ))
}

/// DELETE /resumes/:id
///
/// Removes the stored file first, then the row.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let resume = find_owned(&state, &user, id).await?;
    state.files.delete(&resume.file_path).await?;
    if !state.resumes.delete(&user.id, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> Result<Resume, AppError> {
    state
        .resumes
        .get(&user.id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {id} not found"))
}

/// Header-safe rendition of an uploaded filename.
fn attachment_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}
