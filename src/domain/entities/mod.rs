//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures; behaviour lives in the application services
//! and in the pure helpers of [`crate::domain`].
//!
//! # Entity Types
//!
//! - [`User`] - A registered account
//! - [`Recipe`] - A recipe with its tags and ingredient amounts
//! - [`Tag`] / [`Ingredient`] - Reference data
//! - [`ShortLink`] - A short code resolving to a recipe
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewUser`, `NewRecipe`, `NewTag`, `NewIngredient`, `NewShortLink` - For creating new records
//! - `RecipeUpdate` - For replacing an existing recipe

pub mod catalog;
pub mod recipe;
pub mod short_link;
pub mod user;

pub use catalog::{Ingredient, NewIngredient, NewTag, Tag};
pub use recipe::{
    CartLine, NewRecipe, Recipe, RecipeCollection, RecipeFilter, RecipeFlags, RecipeIngredient,
    RecipeSummary, RecipeUpdate, IngredientAmount, MembershipFilter,
};
pub use short_link::{NewShortLink, ShortLink};
pub use user::{NewUser, User};
