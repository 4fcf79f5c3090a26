//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::RecipeService`] - Recipe validation, CRUD, favorites and cart
//! - [`services::ShoppingListService`] - Shopping list aggregation and export
//! - [`services::ShortLinkService`] - Recipe short-link creation and resolution
//! - [`services::SubscriptionService`] - Author subscriptions
//! - [`services::UserService`] - Registration, profiles, passwords, avatars
//! - [`services::AuthService`] - Token login, logout and request authentication
//! - [`services::CatalogService`] - Tags and ingredients

pub mod services;
