#![allow(dead_code)]

use axum_test::TestServer;
use recipe_share::application::services::RegisterUser;
use recipe_share::config::{Config, PaginationConfig, RecipeLimits, StorageBackend};
use recipe_share::domain::entities::{Ingredient, NewIngredient, NewTag, Tag, User};
use recipe_share::domain::repositories::CatalogRepository;
use recipe_share::infrastructure::cache::NullCache;
use recipe_share::infrastructure::media::LocalMediaStorage;
use recipe_share::infrastructure::memory::MemoryStore;
use recipe_share::routes;
use recipe_share::state::{AppState, Repositories};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const PASSWORD: &str = "correct-horse-9";

pub const BASE_URL: &str = "http://localhost:3000";

pub const FRONTEND_URL: &str = "http://localhost:8080";

/// A 1x1 PNG.
pub const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media_root: TempDir,
}

pub struct Catalog {
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl Catalog {
    pub fn tag(&self, slug: &str) -> i64 {
        self.tags.iter().find(|t| t.slug == slug).unwrap().id
    }

    pub fn ingredient(&self, name: &str) -> i64 {
        self.ingredients.iter().find(|i| i.name == name).unwrap().id
    }
}

pub fn test_config(media_root: &Path) -> Config {
    Config {
        storage_backend: StorageBackend::Memory,
        database_url: None,
        redis_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        behind_proxy: false,
        cache_ttl_seconds: 60,
        token_signing_secret: "test-signing-secret".to_string(),
        public_base_url: BASE_URL.to_string(),
        frontend_base_url: FRONTEND_URL.to_string(),
        media_root: media_root.to_path_buf(),
        short_code_length: 8,
        pagination: PaginationConfig::default(),
        recipe_limits: RecipeLimits::default(),
        db_max_connections: 1,
        db_connect_timeout: 1,
        db_idle_timeout: 1,
        db_max_lifetime: 1,
    }
}

pub fn spawn_app() -> TestApp {
    let media_root = tempfile::tempdir().unwrap();
    let config = test_config(media_root.path());

    let store = Arc::new(MemoryStore::new());
    let media = Arc::new(LocalMediaStorage::new(
        media_root.path(),
        config.public_base_url.clone(),
    ));
    let state = AppState::new(
        Repositories::memory(store.clone()),
        Arc::new(NullCache::new()),
        media,
        &config,
    );

    let server =
        TestServer::new(routes::router(state.clone(), media_root.path().to_path_buf())).unwrap();

    TestApp {
        server,
        state,
        store,
        media_root,
    }
}

pub fn auth(token: &str) -> String {
    format!("Token {token}")
}

pub async fn register(app: &TestApp, username: &str) -> User {
    app.state
        .user_service
        .register(RegisterUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "Cook".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap()
}

pub async fn login(app: &TestApp, user: &User) -> String {
    app.state
        .auth_service
        .login(&user.email, PASSWORD)
        .await
        .unwrap()
}

/// Registers a user and returns it with a fresh token.
pub async fn signed_in(app: &TestApp, username: &str) -> (User, String) {
    let user = register(app, username).await;
    let token = login(app, &user).await;
    (user, token)
}

pub async fn seed_catalog(app: &TestApp) -> Catalog {
    for (name, slug) in [("Breakfast", "breakfast"), ("Dinner", "dinner")] {
        app.store
            .create_tag(NewTag {
                name: name.to_string(),
                slug: slug.to_string(),
            })
            .await
            .unwrap();
    }

    let items = [("Salt", "g"), ("Flour", "g"), ("Milk", "ml"), ("Egg", "pcs")]
        .into_iter()
        .map(|(name, unit)| NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        })
        .collect();
    app.store.import_ingredients(items).await.unwrap();

    Catalog {
        tags: app.store.list_tags().await.unwrap(),
        ingredients: app.store.list_ingredients(None).await.unwrap(),
    }
}

pub fn recipe_payload(name: &str, tags: &[i64], ingredients: &[(i64, i32)]) -> Value {
    let ingredients: Vec<Value> = ingredients
        .iter()
        .map(|(id, amount)| json!({ "id": id, "amount": amount }))
        .collect();

    json!({
        "name": name,
        "text": "Mix and cook.",
        "cooking_time": 20,
        "image": PNG,
        "tags": tags,
        "ingredients": ingredients,
    })
}

/// Creates a recipe over HTTP and returns its id.
pub async fn create_recipe(app: &TestApp, token: &str, payload: Value) -> i64 {
    let response = app
        .server
        .post("/api/recipes")
        .add_header("Authorization", auth(token))
        .json(&payload)
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn insert_user(pool: &sqlx::PgPool, username: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (email, username, first_name, last_name, password_hash)
         VALUES ($1, $2, 'Test', 'Cook', 'x') RETURNING id",
    )
    .bind(format!("{username}@example.com"))
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_tag(pool: &sqlx::PgPool, slug: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO tags (name, slug) VALUES ($1, $1) RETURNING id")
        .bind(slug)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_ingredient(pool: &sqlx::PgPool, name: &str, unit: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(pool)
    .await
    .unwrap()
}
