//! DTOs for recipes, recipe listings and short links.

use serde::{Deserialize, Serialize};

use crate::api::dto::catalog::TagResponse;
use crate::api::dto::pagination::{PageParams, parse_flag, parse_int};
use crate::api::dto::user::UserResponse;
use crate::application::services::{RecipeDetails, RecipeInput, RecipeQuery};
use crate::domain::entities::{IngredientAmount, RecipeIngredient, RecipeSummary};
use crate::error::AppError;
use crate::infrastructure::media::MediaStorage;

#[derive(Debug, Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i64,
    pub amount: i32,
}

/// Create/update payload. Missing fields fall through to service validation.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountRequest>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub cooking_time: i32,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(request: RecipeRequest) -> Self {
        Self {
            name: request.name,
            text: request.text,
            image: request.image,
            cooking_time: request.cooking_time,
            tags: request.tags,
            ingredients: request
                .ingredients
                .into_iter()
                .map(|item| IngredientAmount {
                    ingredient_id: item.id,
                    amount: item.amount,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(item: RecipeIngredient) -> Self {
        Self {
            id: item.ingredient_id,
            name: item.name,
            measurement_unit: item.measurement_unit,
            amount: item.amount,
        }
    }
}

/// Full recipe representation, relative to the caller.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    pub fn new(details: RecipeDetails, author: UserResponse, media: &dyn MediaStorage) -> Self {
        let RecipeDetails { recipe, flags } = details;

        Self {
            id: recipe.id,
            tags: recipe.tags.into_iter().map(Into::into).collect(),
            author,
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
            is_favorited: flags.is_favorited,
            is_in_shopping_cart: flags.is_in_shopping_cart,
            name: recipe.name,
            image: media.url(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short recipe representation used by favorites, cart and subscriptions.
#[derive(Debug, Serialize)]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeSummaryResponse {
    pub fn new(summary: RecipeSummary, media: &dyn MediaStorage) -> Self {
        Self {
            id: summary.id,
            image: media.url(&summary.image),
            name: summary.name,
            cooking_time: summary.cooking_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Parses the recipe list query string.
///
/// `tags` may repeat; the other filters take their last value.
pub fn parse_recipe_query(raw: Option<&str>) -> Result<(PageParams, RecipeQuery), AppError> {
    let mut page = PageParams::default();
    let mut query = RecipeQuery::default();

    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or("").as_bytes()) {
        match key.as_ref() {
            "page" => page.page = Some(parse_int("page", &value)?),
            "limit" => page.limit = Some(parse_int("limit", &value)?),
            "name" => query.name = Some(value.into_owned()),
            "tags" => query.tags.push(value.into_owned()),
            "author" => query.author = Some(parse_int("author", &value)?),
            "is_favorited" => query.is_favorited = Some(parse_flag("is_favorited", &value)?),
            "is_in_shopping_cart" => {
                query.is_in_shopping_cart = Some(parse_flag("is_in_shopping_cart", &value)?)
            }
            _ => {}
        }
    }

    Ok((page, query))
}
