//! Domain layer containing business entities and logic.
//!
//! Independent of infrastructure and presentation concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`shopping_list`] - Cart aggregation and text rendering
//! - [`short_code`] - Deterministic short codes for recipe links
//! - [`permissions`] - Request actors and capability checks
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])

pub mod entities;
pub mod permissions;
pub mod repositories;
pub mod shopping_list;
pub mod short_code;
