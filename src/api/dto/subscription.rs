//! DTOs for subscriptions.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::api::dto::recipe::RecipeSummaryResponse;
use crate::application::services::SubscriptionView;
use crate::infrastructure::media::MediaStorage;

/// `GET /api/users/subscriptions` parameters.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub recipes_limit: Option<i64>,
}

/// `?recipes_limit=` on subscribe.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimitParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub recipes_limit: Option<i64>,
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: i64,
}

impl SubscriptionResponse {
    pub fn new(view: SubscriptionView, media: &dyn MediaStorage) -> Self {
        let SubscriptionView {
            user,
            is_subscribed,
            recipes,
            recipes_count,
        } = view;

        Self {
            avatar: user.avatar.as_deref().map(|path| media.url(path)),
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
            recipes: recipes
                .into_iter()
                .map(|summary| RecipeSummaryResponse::new(summary, media))
                .collect(),
            recipes_count,
        }
    }
}
