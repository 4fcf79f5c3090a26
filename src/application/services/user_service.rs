//! Registration, profiles, passwords and avatars.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::entities::{NewUser, User};
use crate::domain::permissions::Actor;
use crate::domain::repositories::{SubscriptionRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::media::{self, MediaStorage};
use crate::utils::password;
use serde_json::json;

/// Input for [`UserService::register`]. Field formats are checked by the DTO layer.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// A user as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    /// True if the viewer follows this user. Always false for anonymous viewers.
    pub is_subscribed: bool,
}

/// Service for user accounts.
pub struct UserService<
    U: UserRepository + ?Sized,
    S: SubscriptionRepository + ?Sized,
    M: MediaStorage + ?Sized,
> {
    users: Arc<U>,
    subscriptions: Arc<S>,
    media: Arc<M>,
}

impl<U, S, M> UserService<U, S, M>
where
    U: UserRepository + ?Sized,
    S: SubscriptionRepository + ?Sized,
    M: MediaStorage + ?Sized,
{
    pub fn new(users: Arc<U>, subscriptions: Arc<S>, media: Arc<M>) -> Self {
        Self {
            users,
            subscriptions,
            media,
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with per-field details if the email or
    /// username is already taken.
    pub async fn register(&self, input: RegisterUser) -> Result<User, AppError> {
        let mut taken = serde_json::Map::new();
        if self.users.find_by_email(&input.email).await?.is_some() {
            taken.insert(
                "email".to_string(),
                json!(["A user with this email already exists"]),
            );
        }
        if self.users.find_by_username(&input.username).await?.is_some() {
            taken.insert(
                "username".to_string(),
                json!(["A user with this username already exists"]),
            );
        }
        if !taken.is_empty() {
            return Err(AppError::bad_request(
                "Validation failed",
                serde_json::Value::Object(taken),
            ));
        }

        let password_hash = password::hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                email: input.email,
                username: input.username,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }

    /// Returns one page of users and the total count.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), AppError> {
        let users = self.users.list(offset, limit).await?;
        let count = self.users.count().await?;
        Ok((users, count))
    }

    /// Annotates users with the viewer's subscription state.
    pub async fn profiles(
        &self,
        viewer: &Actor,
        users: Vec<User>,
    ) -> Result<Vec<UserProfile>, AppError> {
        let subscribed = self.subscribed_set(viewer, &users).await?;

        Ok(users
            .into_iter()
            .map(|user| UserProfile {
                is_subscribed: subscribed.contains(&user.id),
                user,
            })
            .collect())
    }

    pub async fn profile(&self, viewer: &Actor, user: User) -> Result<UserProfile, AppError> {
        let is_subscribed = match viewer.user_id() {
            Some(viewer_id) if viewer_id != user.id => {
                self.subscriptions.is_subscribed(viewer_id, user.id).await?
            }
            _ => false,
        };

        Ok(UserProfile {
            user,
            is_subscribed,
        })
    }

    /// Loads and annotates the users with the given ids, keyed by id.
    pub async fn profiles_by_id(
        &self,
        viewer: &Actor,
        ids: &[i64],
    ) -> Result<HashMap<i64, UserProfile>, AppError> {
        let unique: Vec<i64> = ids
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let users = self.users.find_by_ids(&unique).await?;

        Ok(self
            .profiles(viewer, users)
            .await?
            .into_iter()
            .map(|profile| (profile.user.id, profile))
            .collect())
    }

    async fn subscribed_set(&self, viewer: &Actor, users: &[User]) -> Result<HashSet<i64>, AppError> {
        let Some(viewer_id) = viewer.user_id() else {
            return Ok(HashSet::new());
        };

        let candidates: Vec<i64> = users
            .iter()
            .map(|u| u.id)
            .filter(|id| *id != viewer_id)
            .collect();
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        self.subscriptions
            .subscribed_among(viewer_id, &candidates)
            .await
    }

    /// Changes the caller's password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for anonymous callers and
    /// [`AppError::Validation`] if `current_password` is wrong.
    pub async fn set_password(
        &self,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = actor.require_user()?;

        let stored = self.users.password_hash(user.id).await?.unwrap_or_default();
        if !password::verify_password(current_password, &stored) {
            return Err(AppError::bad_request(
                "Validation failed",
                json!({ "current_password": ["Wrong password"] }),
            ));
        }

        let hash = password::hash_password(new_password)?;
        self.users.set_password_hash(user.id, &hash).await?;

        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Replaces the caller's avatar with a decoded upload and returns the updated user.
    ///
    /// The previous file, if any, is removed after the new one is stored. A
    /// failed removal is logged and does not fail the request.
    pub async fn set_avatar(&self, actor: &Actor, payload: &str) -> Result<User, AppError> {
        let user = actor.require_user()?;
        let image = media::decode_field("avatar", payload)?;

        let path = self.media.save(media::AVATAR_DIR, image).await?;
        let updated = match self.users.set_avatar(user.id, Some(path.clone())).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Err(cleanup) = self.media.delete(&path).await {
                    tracing::warn!(error = %cleanup, path = %path, "Failed to remove orphaned avatar");
                }
                return Err(e);
            }
        };

        if let Some(old) = &user.avatar {
            if let Err(e) = self.media.delete(old).await {
                tracing::warn!(error = %e, path = %old, "Failed to remove replaced avatar");
            }
        }

        tracing::info!(user_id = user.id, "Avatar updated");
        Ok(updated)
    }

    /// Clears the caller's avatar and removes the stored file.
    pub async fn delete_avatar(&self, actor: &Actor) -> Result<(), AppError> {
        let user = actor.require_user()?;

        self.users.set_avatar(user.id, None).await?;
        if let Some(old) = &user.avatar {
            if let Err(e) = self.media.delete(old).await {
                tracing::warn!(error = %e, path = %old, "Failed to remove avatar");
            }
        }

        Ok(())
    }
}
