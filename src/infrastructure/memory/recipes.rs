//! Recipes, favorites and shopping carts.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{Inner, MemoryStore, RecipeRecord, next};
use crate::domain::entities::{
    CartLine, IngredientAmount, NewRecipe, Recipe, RecipeCollection, RecipeFilter, RecipeFlags,
    RecipeIngredient, RecipeSummary, RecipeUpdate,
};
use crate::domain::repositories::RecipeRepository;
use crate::error::AppError;

impl Inner {
    fn hydrate(&self, record: &RecipeRecord) -> Recipe {
        let mut tags: Vec<_> = record
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.get(id).cloned())
            .collect();
        tags.sort_by_key(|t| t.id);

        let ingredients = record
            .ingredients
            .iter()
            .filter_map(|item| {
                self.ingredients.get(&item.ingredient_id).map(|i| RecipeIngredient {
                    ingredient_id: i.id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: item.amount,
                })
            })
            .collect();

        Recipe {
            id: record.id,
            author_id: record.author_id,
            name: record.name.clone(),
            text: record.text.clone(),
            image: record.image.clone(),
            cooking_time: record.cooking_time,
            tags,
            ingredients,
            created_at: record.created_at,
        }
    }

    fn collection(&self, collection: RecipeCollection) -> &HashSet<(i64, i64)> {
        match collection {
            RecipeCollection::Favorites => &self.favorites,
            RecipeCollection::ShoppingCart => &self.shopping_carts,
        }
    }

    fn collection_mut(&mut self, collection: RecipeCollection) -> &mut HashSet<(i64, i64)> {
        match collection {
            RecipeCollection::Favorites => &mut self.favorites,
            RecipeCollection::ShoppingCart => &mut self.shopping_carts,
        }
    }

    fn matches(&self, filter: &RecipeFilter, record: &RecipeRecord) -> bool {
        if let Some(name) = &filter.name
            && !record.name.to_lowercase().contains(&name.to_lowercase())
        {
            return false;
        }

        if !filter.tags.is_empty() {
            let has_tag = record.tag_ids.iter().any(|id| {
                self.tags
                    .get(id)
                    .is_some_and(|t| filter.tags.contains(&t.slug))
            });
            if !has_tag {
                return false;
            }
        }

        if filter.author_id.is_some_and(|author| author != record.author_id) {
            return false;
        }

        for (membership, collection) in [
            (filter.favorited, RecipeCollection::Favorites),
            (filter.in_shopping_cart, RecipeCollection::ShoppingCart),
        ] {
            if let Some(m) = membership
                && self.collection(collection).contains(&(m.user_id, record.id)) != m.include
            {
                return false;
            }
        }

        true
    }

    /// Newest first.
    fn ordered_matches<'a>(
        &'a self,
        filter: &'a RecipeFilter,
    ) -> impl Iterator<Item = &'a RecipeRecord> + 'a {
        self.recipes
            .values()
            .rev()
            .filter(move |r| self.matches(filter, r))
    }

    /// Applies the schema's tag/ingredient constraints to a write.
    fn check_references(
        &self,
        tag_ids: &[i64],
        ingredients: &[IngredientAmount],
    ) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for item in ingredients {
            if !seen.insert(item.ingredient_id) {
                return Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "recipe_ingredients_recipe_ingredient_key" }),
                ));
            }
            if !self.ingredients.contains_key(&item.ingredient_id) {
                return Err(AppError::bad_request(
                    "Referenced object does not exist",
                    json!({ "constraint": "recipe_ingredients_ingredient_id_fkey" }),
                ));
            }
            if item.amount <= 0 {
                return Err(AppError::bad_request(
                    "Check constraint violation",
                    json!({ "constraint": "recipe_ingredients_amount_check" }),
                ));
            }
        }

        if let Some(missing) = tag_ids.iter().find(|id| !self.tags.contains_key(id)) {
            return Err(AppError::bad_request(
                "Referenced object does not exist",
                json!({ "constraint": "recipe_tags_tag_id_fkey", "tag_id": missing }),
            ));
        }

        Ok(())
    }
}

fn dedup(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create(&self, new_recipe: NewRecipe) -> Result<Recipe, AppError> {
        let mut inner = self.inner.write().await;

        inner.check_references(&new_recipe.tag_ids, &new_recipe.ingredients)?;
        if !inner.users.contains_key(&new_recipe.author_id) {
            return Err(AppError::bad_request(
                "Referenced object does not exist",
                json!({ "constraint": "recipes_author_id_fkey" }),
            ));
        }

        let record = RecipeRecord {
            id: next(&mut inner.seq.recipes),
            author_id: new_recipe.author_id,
            name: new_recipe.name,
            text: new_recipe.text,
            image: new_recipe.image,
            cooking_time: new_recipe.cooking_time,
            tag_ids: dedup(new_recipe.tag_ids),
            ingredients: new_recipe.ingredients,
            created_at: Utc::now(),
        };
        let recipe = inner.hydrate(&record);
        inner.recipes.insert(record.id, record);

        Ok(recipe)
    }

    async fn update(&self, id: i64, update: RecipeUpdate) -> Result<Recipe, AppError> {
        let mut inner = self.inner.write().await;

        inner.check_references(&update.tag_ids, &update.ingredients)?;

        let record = inner
            .recipes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Recipe not found", json!({ "id": id })))?;
        record.name = update.name;
        record.text = update.text;
        if let Some(image) = update.image {
            record.image = image;
        }
        record.cooking_time = update.cooking_time;
        record.tag_ids = dedup(update.tag_ids);
        record.ingredients = update.ingredients;

        let record = record.clone();
        Ok(inner.hydrate(&record))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        if inner.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        inner.favorites.retain(|(_, recipe_id)| *recipe_id != id);
        inner.shopping_carts.retain(|(_, recipe_id)| *recipe_id != id);
        inner.short_links.retain(|_, link| link.recipe_id != id);

        Ok(true)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.get(&id).map(|r| inner.hydrate(r)))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Recipe>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .ordered_matches(filter)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|r| inner.hydrate(r))
            .collect())
    }

    async fn count(&self, filter: &RecipeFilter) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.ordered_matches(filter).count() as i64)
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeSummary>, AppError> {
        let inner = self.inner.read().await;
        let take = limit.map_or(usize::MAX, |l| l.max(0) as usize);

        Ok(inner
            .recipes
            .values()
            .rev()
            .filter(|r| r.author_id == author_id)
            .take(take)
            .map(|r| RecipeSummary {
                id: r.id,
                name: r.name.clone(),
                image: r.image.clone(),
                cooking_time: r.cooking_time,
            })
            .collect())
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .recipes
            .values()
            .filter(|r| r.author_id == author_id)
            .count() as i64)
    }

    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        if !inner.recipes.contains_key(&recipe_id) {
            return Err(AppError::bad_request(
                "Referenced object does not exist",
                json!({ "recipe_id": recipe_id }),
            ));
        }

        Ok(inner.collection_mut(collection).insert((user_id, recipe_id)))
    }

    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.collection_mut(collection).remove(&(user_id, recipe_id)))
    }

    async fn flags(
        &self,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, RecipeFlags>, AppError> {
        let inner = self.inner.read().await;
        Ok(recipe_ids
            .iter()
            .map(|id| {
                (
                    *id,
                    RecipeFlags {
                        is_favorited: inner.favorites.contains(&(user_id, *id)),
                        is_in_shopping_cart: inner.shopping_carts.contains(&(user_id, *id)),
                    },
                )
            })
            .collect())
    }

    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>, AppError> {
        let inner = self.inner.read().await;

        let mut recipe_ids: Vec<i64> = inner
            .shopping_carts
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, recipe_id)| *recipe_id)
            .collect();
        recipe_ids.sort_unstable();

        Ok(recipe_ids
            .iter()
            .filter_map(|id| inner.recipes.get(id))
            .flat_map(|record| record.ingredients.iter())
            .filter_map(|item| {
                inner.ingredients.get(&item.ingredient_id).map(|i| CartLine {
                    ingredient_id: i.id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: item.amount,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{MembershipFilter, NewIngredient, NewTag, NewUser};
    use crate::domain::repositories::CatalogRepository;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        crate::domain::repositories::UserRepository::create(
            &store,
            NewUser {
                email: "cook@example.com".to_string(),
                username: "cook".to_string(),
                first_name: "Ann".to_string(),
                last_name: "Smith".to_string(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();
        for (name, slug) in [("Breakfast", "breakfast"), ("Dinner", "dinner")] {
            store
                .create_tag(NewTag {
                    name: name.to_string(),
                    slug: slug.to_string(),
                })
                .await
                .unwrap();
        }
        store
            .import_ingredients(vec![
                NewIngredient {
                    name: "Salt".to_string(),
                    measurement_unit: "g".to_string(),
                },
                NewIngredient {
                    name: "Eggs".to_string(),
                    measurement_unit: "pcs".to_string(),
                },
            ])
            .await
            .unwrap();
        store
    }

    fn new_recipe(name: &str, tag: i64, salt: i32) -> NewRecipe {
        NewRecipe {
            author_id: 1,
            name: name.to_string(),
            text: "text".to_string(),
            image: "recipes/images/x.png".to_string(),
            cooking_time: 10,
            tag_ids: vec![tag],
            ingredients: vec![
                IngredientAmount {
                    ingredient_id: 1,
                    amount: salt,
                },
                IngredientAmount {
                    ingredient_id: 2,
                    amount: 2,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_duplicate_ingredient_writes_nothing() {
        let store = seeded().await;
        let mut recipe = new_recipe("Omelette", 1, 5);
        recipe.ingredients.push(IngredientAmount {
            ingredient_id: 1,
            amount: 3,
        });

        let err = RecipeRepository::create(&store, recipe).await.unwrap_err();
        assert_eq!(
            err.to_error_info().details["constraint"],
            "recipe_ingredients_recipe_ingredient_key"
        );
        assert_eq!(RecipeRepository::count(&store, &RecipeFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filters_by_tag() {
        let store = seeded().await;
        RecipeRepository::create(&store, new_recipe("Omelette", 1, 5)).await.unwrap();
        RecipeRepository::create(&store, new_recipe("Stew", 2, 10)).await.unwrap();

        let all = RecipeRepository::list(&store, &RecipeFilter::default(), 0, 10).await.unwrap();
        assert_eq!(all[0].name, "Stew");

        let filter = RecipeFilter {
            tags: vec!["breakfast".to_string()],
            ..Default::default()
        };
        let breakfast = RecipeRepository::list(&store, &filter, 0, 10).await.unwrap();
        assert_eq!(breakfast.len(), 1);
        assert_eq!(breakfast[0].name, "Omelette");
    }

    #[tokio::test]
    async fn test_membership_filters() {
        let store = seeded().await;
        let a = RecipeRepository::create(&store, new_recipe("A", 1, 5)).await.unwrap();
        RecipeRepository::create(&store, new_recipe("B", 1, 5)).await.unwrap();
        store
            .add_to_collection(RecipeCollection::Favorites, 1, a.id)
            .await
            .unwrap();

        let only = RecipeFilter {
            favorited: Some(MembershipFilter {
                user_id: 1,
                include: true,
            }),
            ..Default::default()
        };
        let excluded = RecipeFilter {
            favorited: Some(MembershipFilter {
                user_id: 1,
                include: false,
            }),
            ..Default::default()
        };

        assert_eq!(RecipeRepository::list(&store, &only, 0, 10).await.unwrap()[0].name, "A");
        assert_eq!(RecipeRepository::list(&store, &excluded, 0, 10).await.unwrap()[0].name, "B");
    }

    #[tokio::test]
    async fn test_cart_lines_cover_every_cart_recipe() {
        let store = seeded().await;
        let a = RecipeRepository::create(&store, new_recipe("A", 1, 5)).await.unwrap();
        let b = RecipeRepository::create(&store, new_recipe("B", 1, 10)).await.unwrap();
        for id in [a.id, b.id] {
            store
                .add_to_collection(RecipeCollection::ShoppingCart, 1, id)
                .await
                .unwrap();
        }

        let lines = store.cart_lines(1).await.unwrap();
        let salt: i32 = lines
            .iter()
            .filter(|l| l.name == "Salt")
            .map(|l| l.amount)
            .sum();

        assert_eq!(lines.len(), 4);
        assert_eq!(salt, 15);
    }

    #[tokio::test]
    async fn test_delete_cascades_collections() {
        let store = seeded().await;
        let a = RecipeRepository::create(&store, new_recipe("A", 1, 5)).await.unwrap();
        store
            .add_to_collection(RecipeCollection::ShoppingCart, 1, a.id)
            .await
            .unwrap();

        assert!(RecipeRepository::delete(&store, a.id).await.unwrap());

        assert!(store.cart_lines(1).await.unwrap().is_empty());
        assert!(!RecipeRepository::delete(&store, a.id).await.unwrap());
    }
}
