//! Users, tokens and subscriptions.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{MemoryStore, TokenRecord, UserRecord, next};
use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::{
    AuthToken, SubscriptionRepository, TokenRepository, UserRepository,
};
use crate::error::AppError;

fn user_not_found(id: i64) -> AppError {
    AppError::not_found("User not found", json!({ "id": id }))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;

        for record in inner.users.values() {
            if record.user.email.eq_ignore_ascii_case(&new_user.email) {
                return Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "users_email_key" }),
                ));
            }
            if record.user.username == new_user.username {
                return Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "users_username_key" }),
                ));
            }
        }

        let user = User {
            id: next(&mut inner.seq.users),
            email: new_user.email,
            username: new_user.username,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            avatar: None,
            is_staff: false,
            created_at: Utc::now(),
        };
        inner.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|r| r.user.clone()))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().await;
        let wanted: HashSet<&i64> = ids.iter().collect();
        Ok(inner
            .users
            .values()
            .filter(|r| wanted.contains(&r.user.id))
            .map(|r| r.user.clone())
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .map(|r| r.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|r| r.user.username == username)
            .map(|r| r.user.clone()))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|r| r.user.clone())
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.users.len() as i64)
    }

    async fn password_hash(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).map(|r| r.password_hash.clone()))
    }

    async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        record.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn set_avatar(&self, user_id: i64, avatar: Option<String>) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        record.user.avatar = avatar;
        Ok(record.user.clone())
    }

    async fn set_staff(&self, email: &str, is_staff: bool) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        match inner
            .users
            .values_mut()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
        {
            Some(record) => {
                record.user.is_staff = is_staff;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn create_token(&self, user_id: i64, token_hash: &str) -> Result<AuthToken, AppError> {
        let mut inner = self.inner.write().await;

        if inner.tokens.iter().any(|t| t.token.token_hash == token_hash) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "auth_tokens_token_hash_key" }),
            ));
        }
        if !inner.users.contains_key(&user_id) {
            return Err(AppError::bad_request(
                "Referenced object does not exist",
                json!({ "constraint": "auth_tokens_user_id_fkey" }),
            ));
        }

        let token = AuthToken {
            id: next(&mut inner.seq.tokens),
            user_id,
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        };
        inner.tokens.push(TokenRecord {
            token: token.clone(),
            last_used_at: None,
        });

        Ok(token)
    }

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .iter()
            .find(|t| t.token.token_hash == token_hash && t.token.revoked_at.is_none())
            .and_then(|t| inner.users.get(&t.token.user_id))
            .map(|r| r.user.clone()))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner
            .tokens
            .iter_mut()
            .find(|t| t.token.token_hash == token_hash)
        {
            record.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        match inner
            .tokens
            .iter_mut()
            .find(|t| t.token.token_hash == token_hash && t.token.revoked_at.is_none())
        {
            Some(record) => {
                record.token.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn subscribe(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        if follower_id == followee_id {
            return Err(AppError::bad_request(
                "Users cannot subscribe to themselves",
                json!({ "constraint": "subscriptions_no_self_follow" }),
            ));
        }

        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&followee_id) {
            return Err(AppError::bad_request(
                "Referenced object does not exist",
                json!({ "constraint": "subscriptions_followee_id_fkey" }),
            ));
        }
        Ok(inner.subscriptions.insert((follower_id, followee_id)))
    }

    async fn unsubscribe(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.subscriptions.remove(&(follower_id, followee_id)))
    }

    async fn is_subscribed(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.subscriptions.contains(&(follower_id, followee_id)))
    }

    async fn subscribed_among(
        &self,
        follower_id: i64,
        candidate_ids: &[i64],
    ) -> Result<HashSet<i64>, AppError> {
        let inner = self.inner.read().await;
        Ok(candidate_ids
            .iter()
            .copied()
            .filter(|id| inner.subscriptions.contains(&(follower_id, *id)))
            .collect())
    }

    async fn followees(
        &self,
        follower_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .range((follower_id, i64::MIN)..=(follower_id, i64::MAX))
            .filter_map(|(_, followee)| inner.users.get(followee))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|r| r.user.clone())
            .collect())
    }

    async fn count_followees(&self, follower_id: i64) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .range((follower_id, i64::MIN)..=(follower_id, i64::MAX))
            .count() as i64)
    }
}
