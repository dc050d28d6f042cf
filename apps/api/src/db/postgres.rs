use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{PortfolioRepository, ProfileRepository, ResumeRepository, UserRepository};
use crate::errors::AppError;
use crate::models::portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::models::profile::{Profile, ProfileFields};
use crate::models::resume::{NewResume, Resume};
use crate::models::user::{User, UserUpdate};
use crate::models::Pagination;

/// PostgreSQL implementation of every repository trait.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ResumeRepository for PgRepository {
    async fn list(&self, user_id: &str, page: Pagination) -> Result<Vec<Resume>, AppError> {
        let page = page.normalized();
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            SELECT * FROM resumes
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, resume: &NewResume) -> Result<Option<Resume>, AppError> {
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (id, user_id, title, file_path, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(resume.id)
        .bind(&resume.user_id)
        .bind(&resume.title)
        .bind(&resume.file_path)
        .bind(Json(&resume.data))
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ProfileRepository for PgRepository {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert(
        &self,
        user_id: &str,
        email: &str,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, AppError> {
        let assignments = fields.assignments();

        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO profiles (id, user_id, email");
        for (column, _) in &assignments {
            qb.push(", ").push(*column);
        }
        qb.push(") VALUES (")
            .push_bind(Uuid::new_v4())
            .push(", ")
            .push_bind(user_id.to_string())
            .push(", ")
            .push_bind(email.to_string());
        for (_, value) in assignments {
            qb.push(", ").push_bind(value);
        }
        qb.push(") ON CONFLICT (user_id) DO NOTHING RETURNING *");

        Ok(qb
            .build_query_as::<Profile>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, AppError> {
        // Column names come from a fixed list in ProfileFields, never from input.
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE profiles SET updated_at = now()");
        for (column, value) in fields.assignments() {
            qb.push(", ").push(column).push(" = ").push_bind(value);
        }
        qb.push(" WHERE user_id = ")
            .push_bind(user_id.to_string())
            .push(" RETURNING *");

        Ok(qb
            .build_query_as::<Profile>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Portfolios
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PortfolioRepository for PgRepository {
    async fn list(&self, user_id: &str, page: Pagination) -> Result<Vec<Portfolio>, AppError> {
        let page = page.normalized();
        Ok(sqlx::query_as::<_, Portfolio>(
            r#"
            SELECT * FROM portfolios
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Portfolio>, AppError> {
        Ok(sqlx::query_as::<_, Portfolio>(
            "SELECT * FROM portfolios WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(
        &self,
        user_id: &str,
        portfolio: &PortfolioCreate,
    ) -> Result<Option<Portfolio>, AppError> {
        Ok(sqlx::query_as::<_, Portfolio>(
            r#"
            INSERT INTO portfolios
                (id, user_id, name, template_id, data, color, display_mode, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&portfolio.name)
        .bind(&portfolio.template_id)
        .bind(Value::Object(portfolio.data.clone()))
        .bind(&portfolio.color)
        .bind(&portfolio.display_mode)
        .bind(portfolio.is_published)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: &PortfolioUpdate,
    ) -> Result<Option<Portfolio>, AppError> {
        Ok(sqlx::query_as::<_, Portfolio>(
            r#"
            UPDATE portfolios SET
                name = COALESCE($3, name),
                template_id = COALESCE($4, template_id),
                data = COALESCE($5, data),
                color = COALESCE($6, color),
                display_mode = COALESCE($7, display_mode),
                is_published = COALESCE($8, is_published),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.template_id)
        .bind(update.data.clone().map(Value::Object))
        .bind(&update.color)
        .bind(&update.display_mode)
        .bind(update.is_published)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_published(
        &self,
        user_id: &str,
        id: Uuid,
        is_published: bool,
    ) -> Result<Option<Portfolio>, AppError> {
        Ok(sqlx::query_as::<_, Portfolio>(
            r#"
            UPDATE portfolios SET is_published = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(is_published)
        .fetch_optional(&self.pool)
        .await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for PgRepository {
    async fn provision(&self, user_id: &str, email: &str) -> Result<User, AppError> {
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn update(&self, user_id: &str, update: &UserUpdate) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.role)
        .fetch_optional(&self.pool)
        .await?)
    }
}
