use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume: the original file in object storage plus the structured
/// data extracted from it. Never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: String,
    /// Original filename.
    pub title: String,
    pub file_path: String,
    pub data: Json<ResumeData>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a `resumes` row. The id is generated before the
/// file is stored so the object path and the row share it.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub file_path: String,
    pub data: ResumeData,
}

// ────────────────────────────────────────────────────────────────────────────
// Structured resume data (LLM output)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub personal_information: PersonalInformation,
    pub overview: Overview,
    pub projects: Vec<Project>,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInformation {
    pub full_name: String,
    pub contact_info: ContactInfo,
    pub education: Education,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub linkedin: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: String,
    pub majors: Vec<String>,
    pub minors: Vec<String>,
    /// Free-form label such as "May 2026".
    pub expected_grad: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Empty when the resume does not say enough to name a career.
    pub career_name: String,
    pub resume_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub description: String,
    pub employed_dates: String,
}
