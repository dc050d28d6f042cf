//! Resume ingestion: received → extracted → parsed → file-stored → row-stored.
//!
//! Nothing external is written until extraction and parsing have succeeded.
//! The object-store write happens before the row insert, so a row never points
//! at a missing file; if the insert fails the object is removed again.

use tracing::{info, warn};
use uuid::Uuid;

use crate::db::ResumeRepository;
use crate::errors::AppError;
use crate::llm_client::StructuredCompletion;
use crate::models::resume::{NewResume, Resume};
use crate::resumes::extract::{extract_text, DocumentKind};
use crate::resumes::parser::parse_resume;
use crate::storage::{resume_path, FileStore};
use crate::upload::UploadedFile;

/// Capabilities the pipeline needs, borrowed from `AppState`.
#[derive(Clone, Copy)]
pub struct IngestDeps<'a> {
    pub files: &'a dyn FileStore,
    pub resumes: &'a dyn ResumeRepository,
    pub llm: &'a dyn StructuredCompletion,
}

/// Runs the full pipeline for one upload owned by `user_id`.
pub async fn ingest_resume(
    deps: IngestDeps<'_>,
    user_id: &str,
    upload: UploadedFile,
) -> Result<Resume, AppError> {
    // received
    let (title, kind) = validate_upload(&upload)?;
    info!(user_id, title = %title, "Resume received");

    // extracted
    let text = extract_text(upload.bytes.clone(), kind.content_type()).await?;
    info!(user_id, chars = text.len(), "Resume text extracted");

    // parsed
    let data = parse_resume(deps.llm, &text).await?;
    info!(user_id, "Resume parsed");

    // file-stored: one id for both the object path and the row
    let resume_id = Uuid::new_v4();
    let file_path = resume_path(user_id, resume_id, kind.extension());
    deps.files
        .put(&file_path, upload.bytes, kind.content_type())
        .await?;
    info!(user_id, %resume_id, file_path = %file_path, "Resume file stored");

    // row-stored
    let new_resume = NewResume {
        id: resume_id,
        user_id: user_id.to_string(),
        title,
        file_path,
        data,
    };
    let failure = match deps.resumes.insert(&new_resume).await {
        Ok(Some(row)) => {
            info!(user_id, %resume_id, "Resume row stored");
            return Ok(row);
        }
        Ok(None) => "resume insert returned no row".to_string(),
        Err(e) => e.to_string(),
    };

    Err(roll_back_file(deps.files, &new_resume.file_path, failure).await)
}

/// Best-effort removal of the stored object. A failure here is logged and
/// swallowed; the caller always sees the original insert failure.
async fn roll_back_file(files: &dyn FileStore, file_path: &str, failure: String) -> AppError {
    warn!(file_path, "Resume row insert failed ({failure}); removing stored file");
    if let Err(e) = files.delete(file_path).await {
        warn!(file_path, "Rollback of stored resume file failed: {e}");
    }
    AppError::UploadFailed(failure)
}

/// Filename present and content type one of the accepted document types.
fn validate_upload(upload: &UploadedFile) -> Result<(String, DocumentKind), AppError> {
    let title = upload
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadInput("No file uploaded.".to_string()))?
        .to_string();

    let kind = upload
        .content_type
        .as_deref()
        .and_then(DocumentKind::from_content_type)
        .ok_or_else(|| {
            AppError::BadInput("Unsupported file type. Please upload a PDF or DOCX file.".to_string())
        })?;

    Ok((title, kind))
}
