//! Structured resume parsing through the completion service.
//!
//! The service is handed the exact target schema, but its output is still
//! checked here: anything that does not deserialize into [`ResumeData`], or
//! that comes back with an empty summary, is a parsing failure.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmError, StructuredCompletion, StructuredRequest};
use crate::models::resume::ResumeData;
use crate::resumes::prompts::{
    OVERVIEW_FALLBACK_SYSTEM, RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM, RESUME_SCHEMA_NAME,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no parseable output from the completion service ({0})")]
    NoOutput(LlmError),

    #[error("completion service error: {0}")]
    Service(LlmError),

    #[error("output does not match the resume schema: {0}")]
    Schema(String),
}

impl From<LlmError> for ParseError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent | LlmError::Parse(_) | LlmError::Refusal(_) => {
                ParseError::NoOutput(err)
            }
            LlmError::Http(_) | LlmError::Api { .. } => ParseError::Service(err),
        }
    }
}

/// Sends `resume_text` to the completion service and returns validated data.
/// Exactly one completion call is made.
pub async fn parse_resume(
    llm: &dyn StructuredCompletion,
    resume_text: &str,
) -> Result<ResumeData, ParseError> {
    let schema = resume_schema();
    let prompt = RESUME_PARSE_PROMPT.replace("{resume_text}", resume_text);

    let output = llm
        .complete(StructuredRequest {
            system: &[JSON_ONLY_SYSTEM, RESUME_PARSE_SYSTEM, OVERVIEW_FALLBACK_SYSTEM],
            user: &prompt,
            schema_name: RESUME_SCHEMA_NAME,
            schema: &schema,
        })
        .await?;

    let data = validate_resume_data(output)?;
    debug!(
        projects = data.projects.len(),
        skills = data.skills.len(),
        experience = data.experience.len(),
        "Resume parsed"
    );
    Ok(data)
}

/// Checks completion output against the resume schema.
pub fn validate_resume_data(output: Value) -> Result<ResumeData, ParseError> {
    let data: ResumeData =
        serde_json::from_value(output).map_err(|e| ParseError::Schema(e.to_string()))?;

    if data.overview.resume_summary.trim().is_empty() {
        return Err(ParseError::Schema(
            "overview.resume_summary is empty".to_string(),
        ));
    }

    Ok(data)
}

/// JSON schema for [`ResumeData`] in the strict structured-output dialect:
/// every property required, no additional properties.
pub fn resume_schema() -> Value {
    let string = json!({ "type": "string" });
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["personal_information", "overview", "projects", "skills", "experience"],
        "properties": {
            "personal_information": {
                "type": "object",
                "additionalProperties": false,
                "required": ["full_name", "contact_info", "education"],
                "properties": {
                    "full_name": string,
                    "contact_info": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["email", "linkedin", "phone", "address"],
                        "properties": {
                            "email": string,
                            "linkedin": string,
                            "phone": string,
                            "address": string
                        }
                    },
                    "education": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["school", "majors", "minors", "expected_grad"],
                        "properties": {
                            "school": string,
                            "majors": string_list,
                            "minors": string_list,
                            "expected_grad": string
                        }
                    }
                }
            },
            "overview": {
                "type": "object",
                "additionalProperties": false,
                "required": ["career_name", "resume_summary"],
                "properties": {
                    "career_name": string,
                    "resume_summary": string
                }
            },
            "projects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["title", "description"],
                    "properties": {
                        "title": string,
                        "description": string
                    }
                }
            },
            "skills": string_list,
            "experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["company", "description", "employed_dates"],
                    "properties": {
                        "company": string,
                        "description": string,
                        "employed_dates": string
                    }
                }
            }
        }
    })
}
