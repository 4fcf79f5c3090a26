//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries are
//! checked at runtime (`query_as` + `FromRow`), so the crate builds without a
//! database. The schema lives in `migrations/` and is applied at startup.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Accounts, passwords and avatars
//! - [`PgTokenRepository`] - Auth token storage and validation
//! - [`PgCatalogRepository`] - Tags and ingredients
//! - [`PgRecipeRepository`] - Recipes, favorites and shopping carts
//! - [`PgSubscriptionRepository`] - Follower → followee edges
//! - [`PgShortLinkRepository`] - Recipe short links

pub mod pg_catalog_repository;
pub mod pg_recipe_repository;
pub mod pg_short_link_repository;
pub mod pg_subscription_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use pg_catalog_repository::PgCatalogRepository;
pub use pg_recipe_repository::PgRecipeRepository;
pub use pg_short_link_repository::PgShortLinkRepository;
pub use pg_subscription_repository::PgSubscriptionRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;

/// Escapes `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
