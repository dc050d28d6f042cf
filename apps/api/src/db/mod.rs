//! Relational storage. Every query is scoped by the owning user id; a row that
//! exists but belongs to someone else is indistinguishable from a missing row.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::models::profile::{Profile, ProfileFields};
use crate::models::resume::{NewResume, Resume};
use crate::models::user::{User, UserUpdate};
use crate::models::Pagination;

pub mod postgres;

pub use postgres::PgRepository;

/// Creates a PostgreSQL connection pool and applies pending migrations.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: &str, page: Pagination) -> Result<Vec<Resume>, AppError>;

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Resume>, AppError>;

    /// Returns `None` when the backend did not hand back the inserted row.
    async fn insert(&self, resume: &NewResume) -> Result<Option<Resume>, AppError>;

    /// Returns `false` when no owned row matched.
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, AppError>;

    /// `None` when the user already has a profile.
    async fn insert(
        &self,
        user_id: &str,
        email: &str,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, AppError>;

    /// Writes only the provided fields. `None` when the user has no profile.
    async fn update(&self, user_id: &str, fields: &ProfileFields)
        -> Result<Option<Profile>, AppError>;

    async fn delete(&self, user_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: &str, page: Pagination) -> Result<Vec<Portfolio>, AppError>;

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Portfolio>, AppError>;

    async fn insert(
        &self,
        user_id: &str,
        portfolio: &PortfolioCreate,
    ) -> Result<Option<Portfolio>, AppError>;

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: &PortfolioUpdate,
    ) -> Result<Option<Portfolio>, AppError>;

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError>;

    async fn set_published(
        &self,
        user_id: &str,
        id: Uuid,
        is_published: bool,
    ) -> Result<Option<Portfolio>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the caller's row, inserting it from the authenticated identity
    /// on first sight.
    async fn provision(&self, user_id: &str, email: &str) -> Result<User, AppError>;

    async fn update(&self, user_id: &str, update: &UserUpdate) -> Result<Option<User>, AppError>;
}
