//! Plain-text extraction from uploaded resume documents.
//!
//! The extraction method is chosen by the declared content type, never by the
//! filename. Layout is discarded: PDF text is concatenated in page order, DOCX
//! paragraphs are joined with newlines.

use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file encoding: {0}")]
    UnsupportedEncoding(String),

    /// The PDF parsed but holds no text, e.g. a scanned image.
    #[error("No extractable text found in PDF")]
    Unextractable,

    #[error("PDF parsing failed: {0}")]
    Pdf(String),

    #[error("DOCX parsing failed: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Matches the MIME type, ignoring parameters and case.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            PDF_CONTENT_TYPE => Some(Self::Pdf),
            DOCX_CONTENT_TYPE => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => PDF_CONTENT_TYPE,
            Self::Docx => DOCX_CONTENT_TYPE,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// Extracts the text of `bytes` on the blocking pool.
pub async fn extract_text(bytes: Bytes, content_type: &str) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_content_type(content_type)
        .ok_or_else(|| ExtractError::UnsupportedEncoding(content_type.to_string()))?;

    // pdf-extract can panic on malformed input; a panic surfaces as a JoinError.
    tokio::task::spawn_blocking(move || extract_document(&bytes, kind))
        .await
        .map_err(|e| match kind {
            DocumentKind::Pdf => ExtractError::Pdf(e.to_string()),
            DocumentKind::Docx => ExtractError::Docx(e.to_string()),
        })?
}

pub fn extract_document(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ExtractError::Unextractable);
    }
    Ok(text)
}

/// Sparse or empty documents are not an error.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => {
                let mut text = String::new();
                collect_paragraph_text(&p.children, &mut text);
                Some(text)
            }
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn collect_paragraph_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_paragraph_text(&link.children, out),
            _ => {}
        }
    }
}
