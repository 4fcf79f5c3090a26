//! Repository trait for tags and ingredients.

use crate::domain::entities::{Ingredient, NewIngredient, NewTag, Tag};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for reference data.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCatalogRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Lists all tags ordered by id.
    async fn list_tags(&self) -> Result<Vec<Tag>, AppError>;

    /// Finds a tag by id.
    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, AppError>;

    /// Returns the tags whose ids are in `ids`. Unknown ids are skipped.
    async fn find_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, AppError>;

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is taken.
    async fn create_tag(&self, new_tag: NewTag) -> Result<Tag, AppError>;

    /// Lists ingredients whose name contains `name` (case-insensitive).
    ///
    /// Without a filter all ingredients are returned, ordered by name.
    async fn list_ingredients(&self, name: Option<String>) -> Result<Vec<Ingredient>, AppError>;

    /// Finds an ingredient by id.
    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, AppError>;

    /// Returns the ingredients whose ids are in `ids`. Unknown ids are skipped.
    async fn find_ingredients(&self, ids: &[i64]) -> Result<Vec<Ingredient>, AppError>;

    /// Inserts ingredients, skipping exact (name, unit) duplicates.
    ///
    /// Returns the number of inserted rows.
    async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<u64, AppError>;
}
