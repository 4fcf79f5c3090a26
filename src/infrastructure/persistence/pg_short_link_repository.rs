//! PostgreSQL implementation of short link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    id: i64,
    short_code: String,
    recipe_id: i64,
    created_at: DateTime<Utc>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(row: ShortLinkRow) -> Self {
        Self {
            id: row.id,
            short_code: row.short_code,
            recipe_id: row.recipe_id,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for recipe short links.
pub struct PgShortLinkRepository {
    pool: Arc<PgPool>,
}

impl PgShortLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortLinkRepository for PgShortLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row: ShortLinkRow = sqlx::query_as(
            r#"
            INSERT INTO short_links (short_code, recipe_id)
            VALUES ($1, $2)
            RETURNING id, short_code, recipe_id, created_at
            "#,
        )
        .bind(&new_link.short_code)
        .bind(new_link.recipe_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_recipe(&self, recipe_id: i64) -> Result<Option<ShortLink>, AppError> {
        let row: Option<ShortLinkRow> = sqlx::query_as(
            "SELECT id, short_code, recipe_id, created_at FROM short_links WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        let row: Option<ShortLinkRow> = sqlx::query_as(
            "SELECT id, short_code, recipe_id, created_at FROM short_links WHERE short_code = $1",
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }
}
