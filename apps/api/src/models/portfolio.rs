use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub template_id: String,
    pub data: Value,
    pub color: Option<String>,
    pub display_mode: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioCreate {
    pub name: String,
    pub template_id: String,
    pub data: Map<String, Value>,
    #[serde(default = "default_color")]
    pub color: Option<String>,
    #[serde(default = "default_display_mode")]
    pub display_mode: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

fn default_color() -> Option<String> {
    Some("blue".to_string())
}

fn default_display_mode() -> Option<String> {
    Some("light".to_string())
}

/// Partial update. Absent and `null` fields are both left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioUpdate {
    pub name: Option<String>,
    pub template_id: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub color: Option<String>,
    pub display_mode: Option<String>,
    pub is_published: Option<bool>,
}

impl PortfolioUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.template_id.is_none()
            && self.data.is_none()
            && self.color.is_none()
            && self.display_mode.is_none()
            && self.is_published.is_none()
    }

    #[cfg(test)]
    pub fn apply(&self, portfolio: &mut Portfolio) {
        if let Some(name) = &self.name {
            portfolio.name = name.clone();
        }
        if let Some(template_id) = &self.template_id {
            portfolio.template_id = template_id.clone();
        }
        if let Some(data) = &self.data {
            portfolio.data = Value::Object(data.clone());
        }
        if let Some(color) = &self.color {
            portfolio.color = Some(color.clone());
        }
        if let Some(display_mode) = &self.display_mode {
            portfolio.display_mode = Some(display_mode.clone());
        }
        if let Some(is_published) = self.is_published {
            portfolio.is_published = is_published;
        }
    }
}
