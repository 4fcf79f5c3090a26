//! PostgreSQL implementation of catalog repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::escape_like;
use crate::domain::entities::{Ingredient, NewIngredient, NewTag, Tag};
use crate::domain::repositories::CatalogRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    name: String,
    slug: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

#[derive(sqlx::FromRow)]
struct IngredientRow {
    id: i64,
    name: String,
    measurement_unit: String,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
        }
    }
}

/// PostgreSQL repository for tags and ingredients.
pub struct PgCatalogRepository {
    pool: Arc<PgPool>,
}

impl PgCatalogRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT id, name, slug FROM tags ORDER BY id")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, AppError> {
        let row: Option<TagRow> = sqlx::query_as("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, AppError> {
        let rows: Vec<TagRow> =
            sqlx::query_as("SELECT id, name, slug FROM tags WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_tag(&self, new_tag: NewTag) -> Result<Tag, AppError> {
        let row: TagRow = sqlx::query_as(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(&new_tag.name)
        .bind(&new_tag.slug)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_ingredients(&self, name: Option<String>) -> Result<Vec<Ingredient>, AppError> {
        let pattern = name.map(|n| format!("%{}%", escape_like(&n)));

        let rows: Vec<IngredientRow> = sqlx::query_as(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, AppError> {
        let row: Option<IngredientRow> =
            sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(row.map(Into::into))
    }

    async fn find_ingredients(&self, ids: &[i64]) -> Result<Vec<Ingredient>, AppError> {
        let rows: Vec<IngredientRow> = sqlx::query_as(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for item in &items {
            let result = sqlx::query(
                r#"
                INSERT INTO ingredients (name, measurement_unit)
                VALUES ($1, $2)
                ON CONFLICT (name, measurement_unit) DO NOTHING
                "#,
            )
            .bind(&item.name)
            .bind(&item.measurement_unit)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
