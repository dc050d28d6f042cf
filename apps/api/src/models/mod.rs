pub mod portfolio;
pub mod profile;
pub mod resume;
pub mod user;

use serde::Deserialize;

const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 100;

/// `?limit=&offset=` query parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Limit clamped to `0..=100`, offset clamped to be non-negative.
    pub fn normalized(self) -> Self {
        Self {
            limit: self.limit.clamp(0, MAX_PAGE_LIMIT),
            offset: self.offset.max(0),
        }
    }
}
