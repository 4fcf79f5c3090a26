//! PostgreSQL implementation of recipe repository.
//!
//! Recipes are loaded in two steps: the matching `recipes` rows first, then
//! their tags and ingredient amounts in one batch query each.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::sync::Arc;

use super::escape_like;
use crate::domain::entities::{
    CartLine, IngredientAmount, NewRecipe, Recipe, RecipeCollection, RecipeFilter, RecipeFlags,
    RecipeIngredient, RecipeSummary, RecipeUpdate, Tag,
};
use crate::domain::repositories::RecipeRepository;
use crate::error::AppError;

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.created_at";

/// Shared `WHERE` clause for [`RecipeFilter`]; parameters `$1`..`$7`.
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::text IS NULL OR r.name ILIKE $1)
      AND (cardinality($2::text[]) = 0 OR EXISTS (
            SELECT 1 FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = r.id AND t.slug = ANY($2)))
      AND ($3::bigint IS NULL OR r.author_id = $3)
      AND ($4::bigint IS NULL OR EXISTS (
            SELECT 1 FROM favorites f WHERE f.user_id = $4 AND f.recipe_id = r.id) = $5)
      AND ($6::bigint IS NULL OR EXISTS (
            SELECT 1 FROM shopping_carts c WHERE c.user_id = $6 AND c.recipe_id = r.id) = $7)
"#;

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    author_id: i64,
    name: String,
    text: String,
    image: String,
    cooking_time: i32,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RecipeTagRow {
    recipe_id: i64,
    id: i64,
    name: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct RecipeIngredientRow {
    recipe_id: i64,
    ingredient_id: i64,
    name: String,
    measurement_unit: String,
    amount: i32,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    name: String,
    image: String,
    cooking_time: i32,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    ingredient_id: i64,
    name: String,
    measurement_unit: String,
    amount: i32,
}

#[derive(sqlx::FromRow)]
struct FlagsRow {
    id: i64,
    is_favorited: bool,
    is_in_shopping_cart: bool,
}

/// Bind values for [`FILTER_CLAUSE`].
struct FilterParams {
    name: Option<String>,
    tags: Vec<String>,
    author_id: Option<i64>,
    favorited_by: Option<i64>,
    favorited: bool,
    in_cart_of: Option<i64>,
    in_cart: bool,
}

impl From<&RecipeFilter> for FilterParams {
    fn from(filter: &RecipeFilter) -> Self {
        Self {
            name: filter
                .name
                .as_deref()
                .map(|n| format!("%{}%", escape_like(n))),
            tags: filter.tags.clone(),
            author_id: filter.author_id,
            favorited_by: filter.favorited.map(|m| m.user_id),
            favorited: filter.favorited.is_some_and(|m| m.include),
            in_cart_of: filter.in_shopping_cart.map(|m| m.user_id),
            in_cart: filter.in_shopping_cart.is_some_and(|m| m.include),
        }
    }
}

fn collection_table(collection: RecipeCollection) -> &'static str {
    match collection {
        RecipeCollection::Favorites => "favorites",
        RecipeCollection::ShoppingCart => "shopping_carts",
    }
}

/// PostgreSQL repository for recipes, favorites and shopping carts.
pub struct PgRecipeRepository {
    pool: Arc<PgPool>,
}

impl PgRecipeRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Attaches tags and ingredients to the given rows, keeping row order.
    async fn hydrate(&self, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let tag_rows: Vec<RecipeTagRow> = sqlx::query_as(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(self.pool.as_ref())
        .await?;

        let ingredient_rows: Vec<RecipeIngredientRow> = sqlx::query_as(
            r#"
            SELECT ri.recipe_id, i.id AS ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.recipe_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }

        let mut ingredients: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
        for row in ingredient_rows {
            ingredients
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    ingredient_id: row.ingredient_id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount: row.amount,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| Recipe {
                tags: tags.remove(&row.id).unwrap_or_default(),
                ingredients: ingredients.remove(&row.id).unwrap_or_default(),
                id: row.id,
                author_id: row.author_id,
                name: row.name,
                text: row.text,
                image: row.image,
                cooking_time: row.cooking_time,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn load(&self, id: i64) -> Result<Recipe, AppError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::internal("Recipe vanished after write", json!({ "id": id }))
        })
    }
}

/// Replaces the tag and ingredient rows of a recipe.
async fn write_links(
    conn: &mut PgConnection,
    recipe_id: i64,
    tag_ids: &[i64],
    ingredients: &[IngredientAmount],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, UNNEST($2::bigint[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;

    let ingredient_ids: Vec<i64> = ingredients.iter().map(|i| i.ingredient_id).collect();
    let amounts: Vec<i32> = ingredients.iter().map(|i| i.amount).collect();

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, u.ingredient_id, u.amount
        FROM UNNEST($2::bigint[], $3::int[]) WITH ORDINALITY AS u(ingredient_id, amount, ord)
        ORDER BY u.ord
        "#,
    )
    .bind(recipe_id)
    .bind(ingredient_ids.as_slice())
    .bind(amounts.as_slice())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn create(&self, new_recipe: NewRecipe) -> Result<Recipe, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(new_recipe.author_id)
        .bind(&new_recipe.name)
        .bind(&new_recipe.text)
        .bind(&new_recipe.image)
        .bind(new_recipe.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        write_links(&mut *tx, id, &new_recipe.tag_ids, &new_recipe.ingredients).await?;
        tx.commit().await?;

        self.load(id).await
    }

    async fn update(&self, id: i64, update: RecipeUpdate) -> Result<Recipe, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET name = $2, text = $3, image = COALESCE($4, image), cooking_time = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.text)
        .bind(update.image.as_deref())
        .bind(update.cooking_time)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe not found", json!({ "id": id })));
        }

        write_links(&mut *tx, id, &update.tag_ids, &update.ingredients).await?;
        tx.commit().await?;

        self.load(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, AppError> {
        let row: Option<RecipeRow> =
            sqlx::query_as(&format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"))
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Recipe>, AppError> {
        let params = FilterParams::from(filter);

        let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes r
            {FILTER_CLAUSE}
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $8 OFFSET $9
            "#
        ))
        .bind(params.name)
        .bind(params.tags)
        .bind(params.author_id)
        .bind(params.favorited_by)
        .bind(params.favorited)
        .bind(params.in_cart_of)
        .bind(params.in_cart)
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        self.hydrate(rows).await
    }

    async fn count(&self, filter: &RecipeFilter) -> Result<i64, AppError> {
        let params = FilterParams::from(filter);

        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM recipes r {FILTER_CLAUSE}"))
                .bind(params.name)
                .bind(params.tags)
                .bind(params.author_id)
                .bind(params.favorited_by)
                .bind(params.favorited)
                .bind(params.in_cart_of)
                .bind(params.in_cart)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeSummary>, AppError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit.map(|l| l.max(0)))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RecipeSummary {
                id: row.id,
                name: row.name,
                image: row.image,
                cooking_time: row.cooking_time,
            })
            .collect())
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, AppError> {
        let table = collection_table(collection);

        let result = sqlx::query(&format!(
            "INSERT INTO {table} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, AppError> {
        let table = collection_table(collection);

        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE user_id = $1 AND recipe_id = $2"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn flags(
        &self,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, RecipeFlags>, AppError> {
        let rows: Vec<FlagsRow> = sqlx::query_as(
            r#"
            SELECT r.id,
                   EXISTS (SELECT 1 FROM favorites f
                           WHERE f.user_id = $1 AND f.recipe_id = r.id) AS is_favorited,
                   EXISTS (SELECT 1 FROM shopping_carts c
                           WHERE c.user_id = $1 AND c.recipe_id = r.id) AS is_in_shopping_cart
            FROM UNNEST($2::bigint[]) AS r(id)
            "#,
        )
        .bind(user_id)
        .bind(recipe_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    RecipeFlags {
                        is_favorited: row.is_favorited,
                        is_in_shopping_cart: row.is_in_shopping_cart,
                    },
                )
            })
            .collect())
    }

    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>, AppError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r#"
            SELECT i.id AS ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM shopping_carts c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            ORDER BY c.recipe_id, ri.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLine {
                ingredient_id: row.ingredient_id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}
