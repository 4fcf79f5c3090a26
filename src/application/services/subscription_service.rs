//! Follower → followee subscriptions.

use std::sync::Arc;

use crate::domain::entities::{RecipeSummary, User};
use crate::domain::permissions::Actor;
use crate::domain::repositories::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::error::AppError;
use serde_json::json;

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionView {
    pub user: User,
    pub is_subscribed: bool,
    /// Newest first, at most `recipes_limit` entries when a limit was given.
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

/// Service for managing subscriptions.
pub struct SubscriptionService<
    S: SubscriptionRepository + ?Sized,
    U: UserRepository + ?Sized,
    R: RecipeRepository + ?Sized,
> {
    subscriptions: Arc<S>,
    users: Arc<U>,
    recipes: Arc<R>,
}

impl<S, U, R> SubscriptionService<S, U, R>
where
    S: SubscriptionRepository + ?Sized,
    U: UserRepository + ?Sized,
    R: RecipeRepository + ?Sized,
{
    pub fn new(subscriptions: Arc<S>, users: Arc<U>, recipes: Arc<R>) -> Self {
        Self {
            subscriptions,
            users,
            recipes,
        }
    }

    async fn find_user(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }

    async fn view(&self, user: User, recipes_limit: Option<i64>) -> Result<SubscriptionView, AppError> {
        let recipes = self.recipes.list_by_author(user.id, recipes_limit).await?;
        let recipes_count = self.recipes.count_by_author(user.id).await?;

        Ok(SubscriptionView {
            user,
            is_subscribed: true,
            recipes,
            recipes_count,
        })
    }

    /// Subscribes the caller to `target_id` and returns the target's view.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] for anonymous callers
    /// - [`AppError::NotFound`] if the target does not exist
    /// - [`AppError::Conflict`] for self-subscription or an existing subscription
    pub async fn subscribe(
        &self,
        actor: &Actor,
        target_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<SubscriptionView, AppError> {
        let follower = actor.require_user()?;
        let target = self.find_user(target_id).await?;

        if follower.id == target.id {
            return Err(AppError::conflict(
                "You cannot subscribe to yourself",
                json!({ "user_id": target_id }),
            ));
        }

        if !self.subscriptions.subscribe(follower.id, target.id).await? {
            return Err(AppError::conflict(
                "You are already subscribed to this user",
                json!({ "user_id": target_id }),
            ));
        }

        tracing::info!(follower_id = follower.id, followee_id = target.id, "Subscribed");
        self.view(target, recipes_limit).await
    }

    /// Removes the caller's subscription to `target_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the target does not exist and
    /// [`AppError::Validation`] if there is no subscription.
    pub async fn unsubscribe(&self, actor: &Actor, target_id: i64) -> Result<(), AppError> {
        let follower = actor.require_user()?;
        let target = self.find_user(target_id).await?;

        if !self.subscriptions.unsubscribe(follower.id, target.id).await? {
            return Err(AppError::bad_request(
                "You are not subscribed to this user",
                json!({ "user_id": target_id }),
            ));
        }

        tracing::info!(follower_id = follower.id, followee_id = target.id, "Unsubscribed");
        Ok(())
    }

    /// Lists the caller's followees with their recipe previews, and the total.
    pub async fn list(
        &self,
        actor: &Actor,
        offset: i64,
        limit: i64,
        recipes_limit: Option<i64>,
    ) -> Result<(Vec<SubscriptionView>, i64), AppError> {
        let follower = actor.require_user()?;

        let count = self.subscriptions.count_followees(follower.id).await?;
        let followees = self
            .subscriptions
            .followees(follower.id, offset, limit)
            .await?;

        let mut views = Vec::with_capacity(followees.len());
        for user in followees {
            views.push(self.view(user, recipes_limit).await?);
        }

        Ok((views, count))
    }
}
