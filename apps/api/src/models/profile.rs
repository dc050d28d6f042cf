use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 1:1 extension of an authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for profile create/update.
///
/// Each field is `None` when absent from the JSON body and `Some(None)` when
/// explicitly `null`, so an update only touches what the caller sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub full_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub linkedin: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub github: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub website: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub company: Option<Option<String>>,
}

impl ProfileFields {
    /// `(column, value)` pairs for every field the caller provided.
    pub fn assignments(&self) -> Vec<(&'static str, Option<String>)> {
        [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("location", &self.location),
            ("bio", &self.bio),
            ("linkedin", &self.linkedin),
            ("github", &self.github),
            ("website", &self.website),
            ("title", &self.title),
            ("company", &self.company),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.clone().map(|v| (column, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// Applies the provided fields to an in-memory profile.
    #[cfg(test)]
    pub fn apply(&self, profile: &mut Profile) {
        for (column, value) in self.assignments() {
            let slot = match column {
                "full_name" => &mut profile.full_name,
                "phone" => &mut profile.phone,
                "location" => &mut profile.location,
                "bio" => &mut profile.bio,
                "linkedin" => &mut profile.linkedin,
                "github" => &mut profile.github,
                "website" => &mut profile.website,
                "title" => &mut profile.title,
                _ => &mut profile.company,
            };
            *slot = value;
        }
    }
}
