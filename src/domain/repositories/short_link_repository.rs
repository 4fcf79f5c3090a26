//! Repository trait for recipe short links.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links.
///
/// Both `short_code` and `recipe_id` are unique.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepository: Send + Sync {
    /// Persists a short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code or the recipe already has a link.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds the link of a recipe.
    async fn find_by_recipe(&self, recipe_id: i64) -> Result<Option<ShortLink>, AppError>;

    /// Finds a link by its code.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError>;
}
