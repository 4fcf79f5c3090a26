//! Short link entity.

use chrono::{DateTime, Utc};

/// A short code that resolves to a recipe.
///
/// The code is computed once, from the recipe's canonical URL, when the link is
/// first requested; later requests reuse the stored code.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortLink {
    pub id: i64,
    pub short_code: String,
    pub recipe_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Input data for persisting a short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub short_code: String,
    pub recipe_id: i64,
}
