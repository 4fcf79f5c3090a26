//! In-process repository backend.
//!
//! [`MemoryStore`] implements every repository trait over a single
//! `tokio::sync::RwLock`. Multi-row writes take the write lock once, which gives
//! them the same all-or-nothing behaviour as a database transaction. Uniqueness
//! rules mirror the PostgreSQL schema.
//!
//! Selected with `STORAGE_BACKEND=memory`; also backs the HTTP tests.

mod catalog;
mod recipes;
mod users;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tokio::sync::RwLock;

use crate::domain::entities::{Ingredient, IngredientAmount, ShortLink, Tag, User};
use crate::domain::repositories::AuthToken;

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct TokenRecord {
    token: AuthToken,
    last_used_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
struct RecipeRecord {
    id: i64,
    author_id: i64,
    name: String,
    text: String,
    image: String,
    cooking_time: i32,
    tag_ids: Vec<i64>,
    ingredients: Vec<IngredientAmount>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    tokens: i64,
    tags: i64,
    ingredients: i64,
    recipes: i64,
    short_links: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Inner {
    seq: Sequences,
    users: BTreeMap<i64, UserRecord>,
    tokens: Vec<TokenRecord>,
    tags: BTreeMap<i64, Tag>,
    ingredients: BTreeMap<i64, Ingredient>,
    recipes: BTreeMap<i64, RecipeRecord>,
    /// (user_id, recipe_id)
    favorites: HashSet<(i64, i64)>,
    /// (user_id, recipe_id)
    shopping_carts: HashSet<(i64, i64)>,
    /// (follower_id, followee_id)
    subscriptions: BTreeSet<(i64, i64)>,
    short_links: BTreeMap<i64, ShortLink>,
}

/// Repository backend holding all data in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        tracing::debug!("Using in-memory storage");
        Self::default()
    }
}
