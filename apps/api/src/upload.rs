use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// A file pulled out of a multipart request body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Reads the first multipart field named [`FILE_FIELD`]; other fields are skipped.
pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Invalid file", e))?;

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadInput("No file uploaded.".to_string()))
}

/// An over-limit body is reported as such; anything else is a malformed request.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file exceeds the maximum upload size".to_string())
    } else {
        AppError::BadInput(format!("{context}: {err}"))
    }
}
