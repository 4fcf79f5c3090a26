//! Shared application state injected into every handler.
//!
//! Services are stored behind trait objects so the same router runs on the
//! PostgreSQL and the in-memory backend.

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::{
    AuthService, CatalogService, RecipeService, ShoppingListService, ShortLinkService,
    ShortLinkSettings, SubscriptionService, UserService,
};
use crate::config::{Config, PaginationConfig, StorageBackend};
use crate::domain::permissions::Permissions;
use crate::domain::repositories::{
    CatalogRepository, RecipeRepository, ShortLinkRepository, SubscriptionRepository,
    TokenRepository, UserRepository,
};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::persistence::{
    PgCatalogRepository, PgRecipeRepository, PgShortLinkRepository, PgSubscriptionRepository,
    PgTokenRepository, PgUserRepository,
};

pub type DynAuthService = AuthService<dyn TokenRepository, dyn UserRepository>;
pub type DynUserService =
    UserService<dyn UserRepository, dyn SubscriptionRepository, dyn MediaStorage>;
pub type DynCatalogService = CatalogService<dyn CatalogRepository>;
pub type DynRecipeService =
    RecipeService<dyn RecipeRepository, dyn CatalogRepository, dyn MediaStorage>;
pub type DynShoppingListService = ShoppingListService<dyn RecipeRepository>;
pub type DynShortLinkService = ShortLinkService<dyn ShortLinkRepository, dyn RecipeRepository>;
pub type DynSubscriptionService =
    SubscriptionService<dyn SubscriptionRepository, dyn UserRepository, dyn RecipeRepository>;

/// One implementation of every repository trait.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub short_links: Arc<dyn ShortLinkRepository>,
}

impl Repositories {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            tokens: Arc::new(PgTokenRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
            recipes: Arc::new(PgRecipeRepository::new(pool.clone())),
            subscriptions: Arc::new(PgSubscriptionRepository::new(pool.clone())),
            short_links: Arc::new(PgShortLinkRepository::new(pool)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            tokens: store.clone(),
            catalog: store.clone(),
            recipes: store.clone(),
            subscriptions: store.clone(),
            short_links: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<DynAuthService>,
    pub user_service: Arc<DynUserService>,
    pub catalog_service: Arc<DynCatalogService>,
    pub recipe_service: Arc<DynRecipeService>,
    pub shopping_list_service: Arc<DynShoppingListService>,
    pub short_link_service: Arc<DynShortLinkService>,
    pub subscription_service: Arc<DynSubscriptionService>,
    pub media: Arc<dyn MediaStorage>,
    pub cache: Arc<dyn CacheService>,
    pub pagination: PaginationConfig,
    /// Base of absolute URLs in responses (pagination links).
    pub public_base_url: String,
    pub storage_backend: StorageBackend,
}

impl AppState {
    /// Wires every service from the repositories and the loaded configuration.
    pub fn new(
        repositories: Repositories,
        cache: Arc<dyn CacheService>,
        media: Arc<dyn MediaStorage>,
        config: &Config,
    ) -> Self {
        let Repositories {
            users,
            tokens,
            catalog,
            recipes,
            subscriptions,
            short_links,
        } = repositories;

        let short_link_settings = ShortLinkSettings {
            public_base_url: config.public_base_url.clone(),
            frontend_base_url: config.frontend_base_url.clone(),
            code_length: config.short_code_length,
            cache_ttl_seconds: config.cache_ttl_seconds,
        };

        Self {
            auth_service: Arc::new(AuthService::new(
                tokens,
                users.clone(),
                config.token_signing_secret.clone(),
            )),
            user_service: Arc::new(UserService::new(
                users.clone(),
                subscriptions.clone(),
                media.clone(),
            )),
            catalog_service: Arc::new(CatalogService::new(catalog.clone())),
            recipe_service: Arc::new(RecipeService::new(
                recipes.clone(),
                catalog,
                media.clone(),
                config.recipe_limits,
                Permissions::default(),
            )),
            shopping_list_service: Arc::new(ShoppingListService::new(recipes.clone())),
            short_link_service: Arc::new(ShortLinkService::new(
                short_links,
                recipes.clone(),
                cache.clone(),
                short_link_settings,
            )),
            subscription_service: Arc::new(SubscriptionService::new(
                subscriptions,
                users,
                recipes,
            )),
            media,
            cache,
            pagination: config.pagination,
            public_base_url: config.public_base_url.clone(),
            storage_backend: config.storage_backend,
        }
    }
}
