//! Repository trait for recipes and per-user recipe collections.

use std::collections::HashMap;

use crate::domain::entities::{
    CartLine, NewRecipe, Recipe, RecipeCollection, RecipeFilter, RecipeFlags, RecipeSummary,
    RecipeUpdate,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recipes.
///
/// Recipe rows, tag links and ingredient rows are always written together:
/// implementations must apply [`Self::create`] and [`Self::update`] atomically.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRecipeRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_recipe.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Creates a recipe with its tags and ingredients and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] on a duplicate ingredient.
    /// Returns [`AppError::Validation`] if a referenced tag or ingredient is missing.
    async fn create(&self, new_recipe: NewRecipe) -> Result<Recipe, AppError>;

    /// Replaces a recipe's fields, tags and ingredients and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the recipe does not exist.
    async fn update(&self, id: i64, update: RecipeUpdate) -> Result<Recipe, AppError>;

    /// Deletes a recipe. Returns `false` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Finds a recipe by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, AppError>;

    /// Lists recipes matching `filter`, newest first.
    async fn list(
        &self,
        filter: &RecipeFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Recipe>, AppError>;

    /// Counts recipes matching `filter`.
    async fn count(&self, filter: &RecipeFilter) -> Result<i64, AppError>;

    /// Lists an author's recipes in short form, newest first.
    async fn list_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeSummary>, AppError>;

    /// Counts an author's recipes.
    async fn count_by_author(&self, author_id: i64) -> Result<i64, AppError>;

    /// Adds a recipe to a user's collection. Returns `false` if already present.
    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, AppError>;

    /// Removes a recipe from a user's collection. Returns `false` if absent.
    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, AppError>;

    /// Returns the user's favorite/cart membership for each of `recipe_ids`.
    ///
    /// Recipes without any membership may be omitted from the map.
    async fn flags(
        &self,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, RecipeFlags>, AppError>;

    /// Returns every ingredient line of every recipe in the user's cart.
    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>, AppError>;
}
