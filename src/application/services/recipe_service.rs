//! Recipe validation, CRUD, listing filters and per-user collections.
//!
//! # Validation
//!
//! Create and update payloads are checked as a whole before anything is written.
//! Every violation is collected into a field → messages map and returned as a
//! single [`AppError::Validation`]:
//!
//! - `ingredients`: non-empty, no duplicate ids, every id exists, each amount
//!   within [`RecipeLimits`]
//! - `tags`: non-empty, no duplicate ids, every id exists
//! - `cooking_time`: within [`RecipeLimits`]
//! - `name`: non-blank, at most 256 characters
//! - `text`: non-blank
//! - `image`: required on create, optional on update; must decode

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::RecipeLimits;
use crate::domain::entities::{
    IngredientAmount, MembershipFilter, NewRecipe, Recipe, RecipeCollection, RecipeFilter,
    RecipeFlags, RecipeSummary, RecipeUpdate,
};
use crate::domain::permissions::{Actor, Permissions};
use crate::domain::repositories::{CatalogRepository, RecipeRepository};
use crate::error::AppError;
use crate::infrastructure::media::{self, DecodedImage, MediaStorage};

/// Longest accepted recipe name, in characters.
pub const MAX_NAME_LENGTH: usize = 256;

/// Create/update payload after deserialization.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub name: String,
    pub text: String,
    /// Data-URI or bare base64 payload.
    pub image: Option<String>,
    pub cooking_time: i32,
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Listing parameters as requested by the caller.
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<i64>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

/// A recipe together with the caller's favorite/cart membership.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub flags: RecipeFlags,
}

/// One page of recipes plus the total number of matches.
#[derive(Debug, Clone)]
pub struct RecipePage {
    pub recipes: Vec<RecipeDetails>,
    pub count: i64,
}

#[derive(Default)]
struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            return Ok(());
        }

        let details: serde_json::Map<String, Value> = self
            .0
            .into_iter()
            .map(|(field, messages)| (field.to_string(), json!(messages)))
            .collect();
        Err(AppError::bad_request("Validation failed", Value::Object(details)))
    }
}

/// Returns the ids that occur more than once, in first-repeat order.
fn duplicates(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut result = Vec::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            result.push(id);
        }
    }
    result
}

/// Service for recipes.
pub struct RecipeService<
    R: RecipeRepository + ?Sized,
    C: CatalogRepository + ?Sized,
    M: MediaStorage + ?Sized,
> {
    recipes: Arc<R>,
    catalog: Arc<C>,
    media: Arc<M>,
    limits: RecipeLimits,
    permissions: Permissions,
}

impl<R, C, M> RecipeService<R, C, M>
where
    R: RecipeRepository + ?Sized,
    C: CatalogRepository + ?Sized,
    M: MediaStorage + ?Sized,
{
    pub fn new(
        recipes: Arc<R>,
        catalog: Arc<C>,
        media: Arc<M>,
        limits: RecipeLimits,
        permissions: Permissions,
    ) -> Self {
        Self {
            recipes,
            catalog,
            media,
            limits,
            permissions,
        }
    }

    /// Lists recipes for a caller.
    ///
    /// `is_favorited` / `is_in_shopping_cart` are relative to the caller. For an
    /// anonymous caller `Some(true)` yields an empty page and `Some(false)` is
    /// ignored.
    pub async fn list(
        &self,
        actor: &Actor,
        query: RecipeQuery,
        offset: i64,
        limit: i64,
    ) -> Result<RecipePage, AppError> {
        let Some(filter) = Self::build_filter(actor, query) else {
            return Ok(RecipePage {
                recipes: Vec::new(),
                count: 0,
            });
        };

        let count = self.recipes.count(&filter).await?;
        let recipes = self.recipes.list(&filter, offset, limit).await?;
        let recipes = self.attach_flags(actor, recipes).await?;

        Ok(RecipePage { recipes, count })
    }

    /// Returns `None` when the filter can match nothing for this caller.
    fn build_filter(actor: &Actor, query: RecipeQuery) -> Option<RecipeFilter> {
        let membership = |requested: Option<bool>| -> Result<Option<MembershipFilter>, ()> {
            match (requested, actor.user_id()) {
                (None, _) => Ok(None),
                (Some(true), None) => Err(()),
                (Some(false), None) => Ok(None),
                (Some(include), Some(user_id)) => Ok(Some(MembershipFilter { user_id, include })),
            }
        };

        let favorited = membership(query.is_favorited).ok()?;
        let in_shopping_cart = membership(query.is_in_shopping_cart).ok()?;

        Some(RecipeFilter {
            name: query
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            tags: query.tags,
            author_id: query.author,
            favorited,
            in_shopping_cart,
        })
    }

    async fn attach_flags(
        &self,
        actor: &Actor,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeDetails>, AppError> {
        let flags = match actor.user_id() {
            Some(user_id) if !recipes.is_empty() => {
                let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
                self.recipes.flags(user_id, &ids).await?
            }
            _ => HashMap::new(),
        };

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeDetails {
                flags: flags.get(&recipe.id).copied().unwrap_or_default(),
                recipe,
            })
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Recipe, AppError> {
        self.recipes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe not found", json!({ "id": id })))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the recipe does not exist.
    pub async fn get(&self, actor: &Actor, id: i64) -> Result<RecipeDetails, AppError> {
        let recipe = self.find(id).await?;
        let mut details = self.attach_flags(actor, vec![recipe]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::not_found("Recipe not found", json!({ "id": id })))
    }

    /// Validates the payload and returns the decoded image, if one was given.
    ///
    /// Nothing is written.
    pub async fn validate(
        &self,
        input: &RecipeInput,
        image_required: bool,
    ) -> Result<Option<DecodedImage>, AppError> {
        let mut errors = FieldErrors::default();
        let limits = &self.limits;

        if input.name.trim().is_empty() {
            errors.add("name", "This field may not be blank");
        } else if input.name.chars().count() > MAX_NAME_LENGTH {
            errors.add(
                "name",
                format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters"),
            );
        }

        if input.text.trim().is_empty() {
            errors.add("text", "This field may not be blank");
        }

        if !(limits.min_cooking_time..=limits.max_cooking_time).contains(&input.cooking_time) {
            errors.add(
                "cooking_time",
                format!(
                    "Cooking time must be between {} and {}",
                    limits.min_cooking_time, limits.max_cooking_time
                ),
            );
        }

        if input.ingredients.is_empty() {
            errors.add("ingredients", "At least one ingredient is required");
        } else {
            for id in duplicates(input.ingredients.iter().map(|i| i.ingredient_id)) {
                errors.add("ingredients", format!("Duplicate ingredient: {id}"));
            }
            for item in &input.ingredients {
                if !(limits.min_amount..=limits.max_amount).contains(&item.amount) {
                    errors.add(
                        "ingredients",
                        format!(
                            "Amount of ingredient {} must be between {} and {}",
                            item.ingredient_id, limits.min_amount, limits.max_amount
                        ),
                    );
                }
            }

            let ids: Vec<i64> = input
                .ingredients
                .iter()
                .map(|i| i.ingredient_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            let known: HashSet<i64> = self
                .catalog
                .find_ingredients(&ids)
                .await?
                .into_iter()
                .map(|i| i.id)
                .collect();
            let mut missing: Vec<i64> = ids.into_iter().filter(|id| !known.contains(id)).collect();
            missing.sort_unstable();
            for id in missing {
                errors.add("ingredients", format!("Ingredient {id} does not exist"));
            }
        }

        if input.tags.is_empty() {
            errors.add("tags", "At least one tag is required");
        } else {
            for id in duplicates(input.tags.iter().copied()) {
                errors.add("tags", format!("Duplicate tag: {id}"));
            }

            let ids: Vec<i64> = input
                .tags
                .iter()
                .copied()
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            let known: HashSet<i64> = self
                .catalog
                .find_tags(&ids)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();
            let mut missing: Vec<i64> = ids.into_iter().filter(|id| !known.contains(id)).collect();
            missing.sort_unstable();
            for id in missing {
                errors.add("tags", format!("Tag {id} does not exist"));
            }
        }

        let image = match input.image.as_deref().map(str::trim) {
            None | Some("") if image_required => {
                errors.add("image", "This field is required");
                None
            }
            None | Some("") => None,
            Some(payload) => match media::decode_field("image", payload) {
                Ok(image) => Some(image),
                Err(e) => {
                    if let Some(messages) = e.to_error_info().details["image"].as_array() {
                        for message in messages.iter().filter_map(|m| m.as_str()) {
                            errors.add("image", message);
                        }
                    }
                    None
                }
            },
        };

        errors.into_result()?;
        Ok(image)
    }

    /// Creates a recipe authored by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for anonymous callers and
    /// [`AppError::Validation`] for invalid payloads.
    pub async fn create(&self, actor: &Actor, input: RecipeInput) -> Result<RecipeDetails, AppError> {
        let author = actor.require_user()?;
        let image = self
            .validate(&input, true)
            .await?
            .ok_or_else(|| {
                AppError::bad_request("Validation failed", json!({ "image": ["This field is required"] }))
            })?;

        let image_path = self.media.save(media::RECIPE_IMAGE_DIR, image).await?;

        let new_recipe = NewRecipe {
            author_id: author.id,
            name: input.name.trim().to_string(),
            text: input.text,
            image: image_path.clone(),
            cooking_time: input.cooking_time,
            tag_ids: input.tags,
            ingredients: input.ingredients,
        };

        let recipe = match self.recipes.create(new_recipe).await {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Err(cleanup) = self.media.delete(&image_path).await {
                    tracing::warn!(error = %cleanup, path = %image_path, "Failed to remove orphaned image");
                }
                return Err(e);
            }
        };

        metrics::counter!("recipes_created_total").increment(1);
        tracing::info!(recipe_id = recipe.id, author_id = author.id, "Recipe created");

        Ok(RecipeDetails {
            recipe,
            flags: RecipeFlags::default(),
        })
    }

    /// Replaces a recipe's fields, tags and ingredients.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the recipe does not exist,
    /// [`AppError::Unauthorized`] / [`AppError::Forbidden`] if the caller may not
    /// edit it, and [`AppError::Validation`] for invalid payloads.
    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: RecipeInput,
    ) -> Result<RecipeDetails, AppError> {
        let existing = self.find(id).await?;
        self.permissions.ensure_can_write(actor, existing.author_id)?;

        let image = self.validate(&input, false).await?;
        let new_image = match image {
            Some(image) => Some(self.media.save(media::RECIPE_IMAGE_DIR, image).await?),
            None => None,
        };

        let update = RecipeUpdate {
            name: input.name.trim().to_string(),
            text: input.text,
            image: new_image.clone(),
            cooking_time: input.cooking_time,
            tag_ids: input.tags,
            ingredients: input.ingredients,
        };

        let recipe = match self.recipes.update(id, update).await {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(path) = &new_image {
                    if let Err(cleanup) = self.media.delete(path).await {
                        tracing::warn!(error = %cleanup, path = %path, "Failed to remove orphaned image");
                    }
                }
                return Err(e);
            }
        };

        if new_image.is_some() && existing.image != recipe.image {
            if let Err(e) = self.media.delete(&existing.image).await {
                tracing::warn!(error = %e, path = %existing.image, "Failed to remove replaced image");
            }
        }

        tracing::info!(recipe_id = id, "Recipe updated");
        let mut details = self.attach_flags(actor, vec![recipe]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::not_found("Recipe not found", json!({ "id": id })))
    }

    /// Deletes a recipe and its image.
    ///
    /// # Errors
    ///
    /// Same access errors as [`Self::update`].
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), AppError> {
        let existing = self.find(id).await?;
        self.permissions.ensure_can_write(actor, existing.author_id)?;

        if !self.recipes.delete(id).await? {
            return Err(AppError::not_found("Recipe not found", json!({ "id": id })));
        }
        if let Err(e) = self.media.delete(&existing.image).await {
            tracing::warn!(error = %e, path = %existing.image, "Failed to remove recipe image");
        }

        tracing::info!(recipe_id = id, "Recipe deleted");
        Ok(())
    }

    /// Adds a recipe to the caller's favorites or shopping cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown recipes and
    /// [`AppError::Conflict`] if the recipe is already in the collection.
    pub async fn add_to_collection(
        &self,
        actor: &Actor,
        collection: RecipeCollection,
        recipe_id: i64,
    ) -> Result<RecipeSummary, AppError> {
        let user = actor.require_user()?;
        let recipe = self.find(recipe_id).await?;

        if !self
            .recipes
            .add_to_collection(collection, user.id, recipe_id)
            .await?
        {
            return Err(AppError::conflict(
                format!("Recipe is already in {}", collection.label()),
                json!({ "recipe_id": recipe_id }),
            ));
        }

        tracing::debug!(user_id = user.id, recipe_id, collection = collection.label(), "Added to collection");
        Ok(recipe.summary())
    }

    /// Removes a recipe from the caller's favorites or shopping cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown recipes and
    /// [`AppError::Validation`] if the recipe is not in the collection.
    pub async fn remove_from_collection(
        &self,
        actor: &Actor,
        collection: RecipeCollection,
        recipe_id: i64,
    ) -> Result<(), AppError> {
        let user = actor.require_user()?;
        self.find(recipe_id).await?;

        if !self
            .recipes
            .remove_from_collection(collection, user.id, recipe_id)
            .await?
        {
            return Err(AppError::bad_request(
                format!("Recipe is not in {}", collection.label()),
                json!({ "recipe_id": recipe_id }),
            ));
        }

        tracing::debug!(user_id = user.id, recipe_id, collection = collection.label(), "Removed from collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockCatalogRepository, MockRecipeRepository};
    use crate::infrastructure::media::MockMediaStorage;
    use crate::test_support::{sample_ingredient, sample_recipe, sample_tag, sample_user};
    use base64::Engine as _;

    type Service = RecipeService<MockRecipeRepository, MockCatalogRepository, MockMediaStorage>;

    fn service(
        recipes: MockRecipeRepository,
        catalog: MockCatalogRepository,
        media: MockMediaStorage,
    ) -> Service {
        RecipeService::new(
            Arc::new(recipes),
            Arc::new(catalog),
            Arc::new(media),
            RecipeLimits::default(),
            Permissions::default(),
        )
    }

    /// Catalog where every requested id exists.
    fn full_catalog() -> MockCatalogRepository {
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_find_ingredients()
            .returning(|ids| Ok(ids.iter().map(|id| sample_ingredient(*id)).collect()));
        catalog
            .expect_find_tags()
            .returning(|ids| Ok(ids.iter().map(|id| sample_tag(*id)).collect()));
        catalog
    }

    fn image_payload() -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(b"png-bytes")
        )
    }

    fn input() -> RecipeInput {
        RecipeInput {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            image: Some(image_payload()),
            cooking_time: 20,
            tags: vec![1],
            ingredients: vec![IngredientAmount {
                ingredient_id: 1,
                amount: 200,
            }],
        }
    }

    fn author() -> Actor {
        Actor::User(sample_user(1))
    }

    fn details(err: AppError) -> Value {
        err.to_error_info().details
    }

    #[tokio::test]
    async fn test_duplicate_ingredient_rejected_without_writes() {
        let mut recipes = MockRecipeRepository::new();
        recipes.expect_create().never();
        let mut media = MockMediaStorage::new();
        media.expect_save().never();

        let service = service(recipes, full_catalog(), media);
        let mut payload = input();
        payload.ingredients = vec![
            IngredientAmount {
                ingredient_id: 1,
                amount: 2,
            },
            IngredientAmount {
                ingredient_id: 1,
                amount: 3,
            },
        ];

        let err = service.create(&author(), payload).await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(details(err)["ingredients"][0], "Duplicate ingredient: 1");
    }

    #[tokio::test]
    async fn test_collects_all_violations() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_ingredients().returning(|_| Ok(vec![]));
        catalog.expect_find_tags().returning(|_| Ok(vec![]));

        let service = service(MockRecipeRepository::new(), catalog, MockMediaStorage::new());
        let payload = RecipeInput {
            name: " ".to_string(),
            text: String::new(),
            image: None,
            cooking_time: 0,
            tags: vec![5, 5],
            ingredients: vec![IngredientAmount {
                ingredient_id: 9,
                amount: 0,
            }],
        };

        let err = service.validate(&payload, true).await.unwrap_err();
        let details = details(err);

        for field in ["name", "text", "image", "cooking_time", "tags", "ingredients"] {
            assert!(details.get(field).is_some(), "missing error for {field}");
        }
        let ingredient_errors = details["ingredients"].as_array().unwrap();
        assert!(ingredient_errors.iter().any(|m| m == "Ingredient 9 does not exist"));
        assert!(ingredient_errors
            .iter()
            .any(|m| m == "Amount of ingredient 9 must be between 1 and 32000"));
        let tag_errors = details["tags"].as_array().unwrap();
        assert!(tag_errors.iter().any(|m| m == "Duplicate tag: 5"));
        assert!(tag_errors.iter().any(|m| m == "Tag 5 does not exist"));
    }

    #[tokio::test]
    async fn test_empty_lists_rejected() {
        let service = service(
            MockRecipeRepository::new(),
            MockCatalogRepository::new(),
            MockMediaStorage::new(),
        );
        let mut payload = input();
        payload.tags.clear();
        payload.ingredients.clear();

        let details = details(service.validate(&payload, true).await.unwrap_err());

        assert_eq!(details["ingredients"][0], "At least one ingredient is required");
        assert_eq!(details["tags"][0], "At least one tag is required");
    }

    #[tokio::test]
    async fn test_name_length_limit() {
        let service = service(MockRecipeRepository::new(), full_catalog(), MockMediaStorage::new());
        let mut payload = input();
        payload.name = "x".repeat(MAX_NAME_LENGTH + 1);

        assert!(service.validate(&payload, true).await.is_err());

        payload.name = "x".repeat(MAX_NAME_LENGTH);
        assert!(service.validate(&payload, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_image_optional_on_update() {
        let service = service(MockRecipeRepository::new(), full_catalog(), MockMediaStorage::new());
        let mut payload = input();
        payload.image = None;

        assert!(service.validate(&payload, false).await.unwrap().is_none());
        assert!(service.validate(&payload, true).await.is_err());
    }

    #[tokio::test]
    async fn test_create_stores_image_and_recipe() {
        let mut media = MockMediaStorage::new();
        media
            .expect_save()
            .withf(|dir, image| dir == media::RECIPE_IMAGE_DIR && image.bytes == b"png-bytes")
            .times(1)
            .returning(|_, _| Ok("recipes/images/new.png".to_string()));

        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_create()
            .withf(|r| r.author_id == 1 && r.image == "recipes/images/new.png" && r.tag_ids == [1])
            .times(1)
            .returning(|r| {
                let mut recipe = sample_recipe(10, r.author_id);
                recipe.image = r.image;
                Ok(recipe)
            });

        let service = service(recipes, full_catalog(), media);
        let created = service.create(&author(), input()).await.unwrap();

        assert_eq!(created.recipe.id, 10);
        assert_eq!(created.flags, RecipeFlags::default());
    }

    #[tokio::test]
    async fn test_create_requires_auth() {
        let service = service(
            MockRecipeRepository::new(),
            MockCatalogRepository::new(),
            MockMediaStorage::new(),
        );

        let result = service.create(&Actor::Anonymous, input()).await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 1))));
        recipes.expect_update().never();

        let service = service(recipes, full_catalog(), MockMediaStorage::new());
        let result = service
            .update(&Actor::User(sample_user(2)), 10, input())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_stored_file() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 1))));
        recipes
            .expect_update()
            .withf(|id, update| *id == 10 && update.image.is_none())
            .returning(|id, _| Ok(sample_recipe(id, 1)));
        recipes.expect_flags().returning(|_, _| Ok(HashMap::new()));

        let mut media = MockMediaStorage::new();
        media.expect_save().never();
        media.expect_delete().never();

        let service = service(recipes, full_catalog(), media);
        let mut payload = input();
        payload.image = None;

        let updated = service.update(&author(), 10, payload).await.unwrap();
        assert_eq!(updated.recipe.image, "recipes/images/10.png");
    }

    #[tokio::test]
    async fn test_delete_removes_image() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 1))));
        recipes.expect_delete().returning(|_| Ok(true));

        let mut media = MockMediaStorage::new();
        media
            .expect_delete()
            .withf(|path| path == "recipes/images/10.png")
            .times(1)
            .returning(|_| Ok(()));

        let service = service(recipes, MockCatalogRepository::new(), media);

        assert!(service.delete(&author(), 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_update_removes_new_image() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 1))));
        recipes
            .expect_update()
            .times(1)
            .returning(|id, _| Err(AppError::not_found("Recipe not found", json!({ "id": id }))));

        let mut media = MockMediaStorage::new();
        media
            .expect_save()
            .returning(|_, _| Ok("recipes/images/new.png".to_string()));
        media
            .expect_delete()
            .withf(|path| path == "recipes/images/new.png")
            .times(1)
            .returning(|_| Ok(()));

        let service = service(recipes, full_catalog(), media);
        let result = service.update(&author(), 10, input()).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_succeeds_when_old_image_cleanup_fails() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 1))));
        recipes.expect_update().returning(|id, update| {
            let mut recipe = sample_recipe(id, 1);
            recipe.image = update.image.unwrap_or(recipe.image);
            Ok(recipe)
        });
        recipes.expect_flags().returning(|_, _| Ok(HashMap::new()));

        let mut media = MockMediaStorage::new();
        media
            .expect_save()
            .returning(|_, _| Ok("recipes/images/new.png".to_string()));
        media
            .expect_delete()
            .withf(|path| path == "recipes/images/10.png")
            .times(1)
            .returning(|_| Err(AppError::internal("Disk error", json!({}))));

        let service = service(recipes, full_catalog(), media);
        let updated = service.update(&author(), 10, input()).await.unwrap();

        assert_eq!(updated.recipe.image, "recipes/images/new.png");
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_image_cleanup_fails() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 1))));
        recipes.expect_delete().times(1).returning(|_| Ok(true));

        let mut media = MockMediaStorage::new();
        media
            .expect_delete()
            .times(1)
            .returning(|_| Err(AppError::internal("Disk error", json!({}))));

        let service = service(recipes, MockCatalogRepository::new(), media);

        assert!(service.delete(&author(), 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_anonymous_favorited_filter_yields_empty_page() {
        let mut recipes = MockRecipeRepository::new();
        recipes.expect_list().never();
        recipes.expect_count().never();

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let query = RecipeQuery {
            is_favorited: Some(true),
            ..Default::default()
        };

        let page = service.list(&Actor::Anonymous, query, 0, 6).await.unwrap();

        assert_eq!(page.count, 0);
        assert!(page.recipes.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_negative_filter_is_ignored() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_count()
            .withf(|filter| filter.in_shopping_cart.is_none())
            .returning(|_| Ok(1));
        recipes
            .expect_list()
            .returning(|_, _, _| Ok(vec![sample_recipe(1, 2)]));
        recipes.expect_flags().never();

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let query = RecipeQuery {
            is_in_shopping_cart: Some(false),
            ..Default::default()
        };

        let page = service.list(&Actor::Anonymous, query, 0, 6).await.unwrap();

        assert_eq!(page.count, 1);
        assert!(!page.recipes[0].flags.is_in_shopping_cart);
    }

    #[tokio::test]
    async fn test_authenticated_filters_and_flags() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_count()
            .withf(|filter| {
                filter.favorited
                    == Some(MembershipFilter {
                        user_id: 1,
                        include: true,
                    })
                    && filter.tags == ["breakfast", "lunch"]
            })
            .returning(|_| Ok(1));
        recipes
            .expect_list()
            .returning(|_, _, _| Ok(vec![sample_recipe(4, 2)]));
        recipes.expect_flags().returning(|_, _| {
            Ok(HashMap::from([(
                4,
                RecipeFlags {
                    is_favorited: true,
                    is_in_shopping_cart: false,
                },
            )]))
        });

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let query = RecipeQuery {
            tags: vec!["breakfast".to_string(), "lunch".to_string()],
            is_favorited: Some(true),
            ..Default::default()
        };

        let page = service.list(&author(), query, 0, 6).await.unwrap();

        assert!(page.recipes[0].flags.is_favorited);
    }

    #[tokio::test]
    async fn test_add_duplicate_favorite_conflicts() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 2))));
        recipes
            .expect_add_to_collection()
            .returning(|_, _, _| Ok(false));

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let result = service
            .add_to_collection(&author(), RecipeCollection::Favorites, 3)
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_add_to_cart_returns_summary() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 2))));
        recipes
            .expect_add_to_collection()
            .withf(|collection, user, recipe| {
                *collection == RecipeCollection::ShoppingCart && *user == 1 && *recipe == 3
            })
            .returning(|_, _, _| Ok(true));

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let summary = service
            .add_to_collection(&author(), RecipeCollection::ShoppingCart, 3)
            .await
            .unwrap();

        assert_eq!(summary.id, 3);
    }

    #[tokio::test]
    async fn test_remove_absent_is_rejected() {
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, 2))));
        recipes
            .expect_remove_from_collection()
            .returning(|_, _, _| Ok(false));

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let result = service
            .remove_from_collection(&author(), RecipeCollection::Favorites, 3)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_collection_unknown_recipe_is_not_found() {
        let mut recipes = MockRecipeRepository::new();
        recipes.expect_find_by_id().returning(|_| Ok(None));

        let service = service(recipes, MockCatalogRepository::new(), MockMediaStorage::new());
        let result = service
            .add_to_collection(&author(), RecipeCollection::Favorites, 404)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_duplicates_reports_each_id_once() {
        assert_eq!(duplicates([1, 2, 1, 1, 3, 2]), vec![1, 2]);
        assert!(duplicates([1, 2, 3]).is_empty());
    }
}
