//! PostgreSQL implementation of subscription repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;

use super::pg_user_repository::UserRow;
use crate::domain::entities::User;
use crate::domain::repositories::SubscriptionRepository;
use crate::error::AppError;

/// PostgreSQL repository for the `subscriptions` edge table.
pub struct PgSubscriptionRepository {
    pool: Arc<PgPool>,
}

impl PgSubscriptionRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn subscribe(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unsubscribe(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower_id)
                .bind(followee_id)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_subscribed(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions WHERE follower_id = $1 AND followee_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn subscribed_among(
        &self,
        follower_id: i64,
        candidate_ids: &[i64],
    ) -> Result<HashSet<i64>, AppError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT followee_id FROM subscriptions WHERE follower_id = $1 AND followee_id = ANY($2)",
        )
        .bind(follower_id)
        .bind(candidate_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn followees(
        &self,
        follower_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   u.avatar, u.is_staff, u.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.followee_id
            WHERE s.follower_id = $1
            ORDER BY u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(follower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_followees(&self, follower_id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE follower_id = $1")
                .bind(follower_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
