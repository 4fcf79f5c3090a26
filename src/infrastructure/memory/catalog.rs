//! Tags, ingredients and short links.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{MemoryStore, next};
use crate::domain::entities::{Ingredient, NewIngredient, NewShortLink, NewTag, ShortLink, Tag};
use crate::domain::repositories::{CatalogRepository, ShortLinkRepository};
use crate::error::AppError;

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        Ok(self.inner.read().await.tags.values().cloned().collect())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, AppError> {
        Ok(self.inner.read().await.tags.get(&id).cloned())
    }

    async fn find_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tags
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn create_tag(&self, new_tag: NewTag) -> Result<Tag, AppError> {
        let mut inner = self.inner.write().await;

        if inner.tags.values().any(|t| t.slug == new_tag.slug) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "tags_slug_key" }),
            ));
        }

        let tag = Tag {
            id: next(&mut inner.seq.tags),
            name: new_tag.name,
            slug: new_tag.slug,
        };
        inner.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn list_ingredients(&self, name: Option<String>) -> Result<Vec<Ingredient>, AppError> {
        let inner = self.inner.read().await;
        let needle = name.map(|n| n.to_lowercase());

        let mut result: Vec<Ingredient> = inner
            .ingredients
            .values()
            .filter(|i| match &needle {
                Some(needle) => i.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(result)
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, AppError> {
        Ok(self.inner.read().await.ingredients.get(&id).cloned())
    }

    async fn find_ingredients(&self, ids: &[i64]) -> Result<Vec<Ingredient>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .ingredients
            .values()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<u64, AppError> {
        let mut inner = self.inner.write().await;
        let mut inserted = 0;

        for item in items {
            let exists = inner
                .ingredients
                .values()
                .any(|i| i.name == item.name && i.measurement_unit == item.measurement_unit);
            if exists {
                continue;
            }

            let ingredient = Ingredient {
                id: next(&mut inner.seq.ingredients),
                name: item.name,
                measurement_unit: item.measurement_unit,
            };
            inner.ingredients.insert(ingredient.id, ingredient);
            inserted += 1;
        }

        Ok(inserted)
    }
}

#[async_trait]
impl ShortLinkRepository for MemoryStore {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut inner = self.inner.write().await;

        if inner
            .short_links
            .values()
            .any(|l| l.short_code == new_link.short_code || l.recipe_id == new_link.recipe_id)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_links_unique" }),
            ));
        }
        if !inner.recipes.contains_key(&new_link.recipe_id) {
            return Err(AppError::bad_request(
                "Referenced object does not exist",
                json!({ "constraint": "short_links_recipe_id_fkey" }),
            ));
        }

        let link = ShortLink {
            id: next(&mut inner.seq.short_links),
            short_code: new_link.short_code,
            recipe_id: new_link.recipe_id,
            created_at: Utc::now(),
        };
        inner.short_links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_by_recipe(&self, recipe_id: i64) -> Result<Option<ShortLink>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .short_links
            .values()
            .find(|l| l.recipe_id == recipe_id)
            .cloned())
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .short_links
            .values()
            .find(|l| l.short_code == short_code)
            .cloned())
    }
}
