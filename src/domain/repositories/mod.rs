//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented by the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - PostgreSQL implementations live in `crate::infrastructure::persistence`
//! - In-process implementations live in `crate::infrastructure::memory`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - Accounts, passwords and avatars
//! - [`TokenRepository`] - Auth token storage
//! - [`CatalogRepository`] - Tags and ingredients
//! - [`RecipeRepository`] - Recipes, favorites and shopping carts
//! - [`SubscriptionRepository`] - Follower → followee edges
//! - [`ShortLinkRepository`] - Short codes for recipes
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod catalog_repository;
pub mod recipe_repository;
pub mod short_link_repository;
pub mod subscription_repository;
pub mod token_repository;
pub mod user_repository;

pub use catalog_repository::CatalogRepository;
pub use recipe_repository::RecipeRepository;
pub use short_link_repository::ShortLinkRepository;
pub use subscription_repository::SubscriptionRepository;
pub use token_repository::{AuthToken, TokenRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
#[cfg(test)]
pub use short_link_repository::MockShortLinkRepository;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
