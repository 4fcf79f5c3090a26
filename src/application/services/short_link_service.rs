//! Deterministic short links for recipes.
//!
//! # Code derivation
//!
//! A recipe's code is the first `code_length` hex characters of the SHA-256 of
//! its canonical URL `{public_base_url}/api/recipes/{id}/`. The code is computed
//! once and stored; later requests return the stored link unchanged.
//!
//! If the derived code already belongs to another recipe, the URL is re-hashed
//! as `"{url}#1"`, `"{url}#2"`, ... up to [`MAX_CODE_ATTEMPTS`] times.
//!
//! # Resolution
//!
//! `GET /s/{code}` looks the code up in the cache, then in storage, and redirects
//! to `{frontend_base_url}/recipes/{id}`.

use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{RecipeRepository, ShortLinkRepository};
use crate::domain::short_code;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use serde_json::json;

/// Number of codes tried for one recipe before giving up.
pub const MAX_CODE_ATTEMPTS: u32 = 10;

/// URL and code settings for [`ShortLinkService`].
#[derive(Debug, Clone)]
pub struct ShortLinkSettings {
    pub public_base_url: String,
    pub frontend_base_url: String,
    pub code_length: usize,
    pub cache_ttl_seconds: u64,
}

/// Service for creating and resolving recipe short links.
pub struct ShortLinkService<L: ShortLinkRepository + ?Sized, R: RecipeRepository + ?Sized> {
    links: Arc<L>,
    recipes: Arc<R>,
    cache: Arc<dyn CacheService>,
    settings: ShortLinkSettings,
}

impl<L: ShortLinkRepository + ?Sized, R: RecipeRepository + ?Sized> ShortLinkService<L, R> {
    pub fn new(
        links: Arc<L>,
        recipes: Arc<R>,
        cache: Arc<dyn CacheService>,
        settings: ShortLinkSettings,
    ) -> Self {
        Self {
            links,
            recipes,
            cache,
            settings,
        }
    }

    /// Canonical detail URL a recipe's code is derived from.
    pub fn canonical_url(&self, recipe_id: i64) -> String {
        format!("{}/api/recipes/{}/", self.settings.public_base_url, recipe_id)
    }

    /// Public short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/s/{}", self.settings.public_base_url, short_code)
    }

    /// Front-end page a resolved code redirects to.
    pub fn redirect_url(&self, recipe_id: i64) -> String {
        format!("{}/recipes/{}", self.settings.frontend_base_url, recipe_id)
    }

    /// Returns the recipe's short link, creating it on first request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the recipe does not exist and
    /// [`AppError::Internal`] if every candidate code is taken.
    pub async fn get_or_create(&self, recipe_id: i64) -> Result<ShortLink, AppError> {
        if self.recipes.find_by_id(recipe_id).await?.is_none() {
            return Err(AppError::not_found(
                "Recipe not found",
                json!({ "id": recipe_id }),
            ));
        }

        if let Some(existing) = self.links.find_by_recipe(recipe_id).await? {
            return Ok(existing);
        }

        let url = self.canonical_url(recipe_id);

        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code = short_code::generate_with_attempt(&url, self.settings.code_length, attempt);

            if let Some(taken) = self.links.find_by_code(&code).await? {
                if taken.recipe_id == recipe_id {
                    return Ok(taken);
                }
                tracing::warn!(short_code = %code, recipe_id, attempt, "Short code collision");
                continue;
            }

            let new_link = NewShortLink {
                short_code: code.clone(),
                recipe_id,
            };

            match self.links.create(new_link).await {
                Ok(link) => {
                    metrics::counter!("short_links_created_total").increment(1);
                    tracing::info!(short_code = %link.short_code, recipe_id, "Short link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    // Lost a race: either this recipe got its link concurrently,
                    // or another recipe took the code.
                    if let Some(existing) = self.links.find_by_recipe(recipe_id).await? {
                        return Ok(existing);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to allocate a unique short code",
            json!({ "recipe_id": recipe_id, "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }

    /// Resolves a code to its recipe id.
    ///
    /// Cache errors are treated as misses.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for malformed or unknown codes.
    pub async fn resolve(&self, short_code: &str) -> Result<i64, AppError> {
        let not_found = || AppError::not_found("Short link not found", json!({ "code": short_code }));

        if !short_code::is_well_formed(short_code) {
            return Err(not_found());
        }

        if let Ok(Some(recipe_id)) = self.cache.get_recipe_id(short_code).await {
            metrics::counter!("short_link_redirects_total").increment(1);
            return Ok(recipe_id);
        }

        let link = self
            .links
            .find_by_code(short_code)
            .await?
            .ok_or_else(not_found)?;

        if let Err(e) = self
            .cache
            .set_recipe_id(short_code, link.recipe_id, Some(self.settings.cache_ttl_seconds))
            .await
        {
            tracing::warn!(error = %e, "Failed to cache short link");
        }

        metrics::counter!("short_link_redirects_total").increment(1);
        Ok(link.recipe_id)
    }

    /// Returns the stored link of a recipe without creating one.
    pub async fn find_for_recipe(&self, recipe_id: i64) -> Result<Option<ShortLink>, AppError> {
        self.links.find_by_recipe(recipe_id).await
    }

    /// Drops a cached code, e.g. after its recipe was deleted.
    pub async fn invalidate(&self, short_code: &str) {
        if let Err(e) = self.cache.invalidate(short_code).await {
            tracing::warn!(error = %e, short_code, "Failed to invalidate cached short link");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockRecipeRepository, MockShortLinkRepository};
    use crate::infrastructure::cache::{MockCacheService, NullCache};
    use crate::test_support::sample_recipe;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings() -> ShortLinkSettings {
        ShortLinkSettings {
            public_base_url: "https://recipes.example.com".to_string(),
            frontend_base_url: "https://app.example.com".to_string(),
            code_length: 8,
            cache_ttl_seconds: 60,
        }
    }

    fn link(code: &str, recipe_id: i64) -> ShortLink {
        ShortLink {
            id: 1,
            short_code: code.to_string(),
            recipe_id,
            created_at: Utc::now(),
        }
    }

    fn recipes_with(id: i64) -> MockRecipeRepository {
        let mut recipes = MockRecipeRepository::new();
        recipes.expect_find_by_id().returning(move |rid| {
            Ok((rid == id).then(|| sample_recipe(rid, 1)))
        });
        recipes
    }

    fn service(
        links: MockShortLinkRepository,
        recipes: MockRecipeRepository,
        cache: Arc<dyn CacheService>,
    ) -> ShortLinkService<MockShortLinkRepository, MockRecipeRepository> {
        ShortLinkService::new(Arc::new(links), Arc::new(recipes), cache, settings())
    }

    #[tokio::test]
    async fn test_creates_code_from_canonical_url() {
        let expected = short_code::generate("https://recipes.example.com/api/recipes/7/", 8);
        let expected_clone = expected.clone();

        let mut links = MockShortLinkRepository::new();
        links.expect_find_by_recipe().returning(|_| Ok(None));
        links.expect_find_by_code().returning(|_| Ok(None));
        links
            .expect_create()
            .withf(move |new_link| new_link.short_code == expected_clone && new_link.recipe_id == 7)
            .times(1)
            .returning(|new_link| Ok(link(&new_link.short_code, new_link.recipe_id)));

        let service = service(links, recipes_with(7), Arc::new(NullCache::new()));
        let created = service.get_or_create(7).await.unwrap();

        assert_eq!(created.short_code, expected);
        assert_eq!(
            service.short_url(&created.short_code),
            format!("https://recipes.example.com/s/{expected}")
        );
    }

    #[tokio::test]
    async fn test_existing_link_is_returned_unchanged() {
        let mut links = MockShortLinkRepository::new();
        links
            .expect_find_by_recipe()
            .returning(|id| Ok(Some(link("deadbeef", id))));
        links.expect_create().never();

        let service = service(links, recipes_with(7), Arc::new(NullCache::new()));

        assert_eq!(service.get_or_create(7).await.unwrap().short_code, "deadbeef");
    }

    #[tokio::test]
    async fn test_collision_uses_next_attempt() {
        let url = "https://recipes.example.com/api/recipes/7/";
        let first = short_code::generate_with_attempt(url, 8, 0);
        let second = short_code::generate_with_attempt(url, 8, 1);
        let (first_clone, second_clone) = (first.clone(), second.clone());

        let mut links = MockShortLinkRepository::new();
        links.expect_find_by_recipe().returning(|_| Ok(None));
        links.expect_find_by_code().returning(move |code| {
            Ok((code == first_clone).then(|| link(code, 99)))
        });
        links
            .expect_create()
            .withf(move |new_link| new_link.short_code == second_clone)
            .times(1)
            .returning(|new_link| Ok(link(&new_link.short_code, new_link.recipe_id)));

        let service = service(links, recipes_with(7), Arc::new(NullCache::new()));

        assert_eq!(service.get_or_create(7).await.unwrap().short_code, second);
    }

    #[tokio::test]
    async fn test_insert_race_rereads_stored_link() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut links = MockShortLinkRepository::new();
        links.expect_find_by_recipe().times(2).returning(move |id| {
            // The first lookup misses; the re-read after the conflict finds the winner.
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                Ok(Some(link("cafebabe", id)))
            }
        });
        links.expect_find_by_code().returning(|_| Ok(None));
        links
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let service = service(links, recipes_with(7), Arc::new(NullCache::new()));

        assert_eq!(service.get_or_create(7).await.unwrap().short_code, "cafebabe");
    }

    #[tokio::test]
    async fn test_unknown_recipe_is_not_found() {
        let mut links = MockShortLinkRepository::new();
        links.expect_create().never();

        let service = service(links, recipes_with(7), Arc::new(NullCache::new()));

        assert!(matches!(
            service.get_or_create(8).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let mut links = MockShortLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(None));

        let service = service(links, MockRecipeRepository::new(), Arc::new(NullCache::new()));

        assert!(matches!(
            service.resolve("0123abcd").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_storage() {
        let mut links = MockShortLinkRepository::new();
        links.expect_find_by_code().never();

        let service = service(links, MockRecipeRepository::new(), Arc::new(NullCache::new()));

        assert!(service.resolve("NOT-HEX!").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_uses_cache_hit() {
        let mut cache = MockCacheService::new();
        cache
            .expect_get_recipe_id()
            .returning(|_| Ok(Some(42)));
        let mut links = MockShortLinkRepository::new();
        links.expect_find_by_code().never();

        let service = service(links, MockRecipeRepository::new(), Arc::new(cache));

        assert_eq!(service.resolve("0123abcd").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_resolve_fills_cache_on_miss() {
        let mut cache = MockCacheService::new();
        cache.expect_get_recipe_id().returning(|_| Ok(None));
        cache
            .expect_set_recipe_id()
            .withf(|code, recipe_id, ttl| code == "0123abcd" && *recipe_id == 5 && *ttl == Some(60))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut links = MockShortLinkRepository::new();
        links
            .expect_find_by_code()
            .returning(|code| Ok(Some(link(code, 5))));

        let service = service(links, MockRecipeRepository::new(), Arc::new(cache));

        assert_eq!(service.resolve("0123abcd").await.unwrap(), 5);
        assert_eq!(service.redirect_url(5), "https://app.example.com/recipes/5");
    }
}
