//! Repository trait for user subscriptions.

use std::collections::HashSet;

use crate::domain::entities::User;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the directed follower → followee edge set.
///
/// Edges are keyed by `(follower_id, followee_id)`; storage rejects self-edges.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSubscriptionRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Adds an edge. Returns `false` if it already existed.
    async fn subscribe(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Removes an edge. Returns `false` if it did not exist.
    async fn unsubscribe(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Returns true if the edge exists.
    async fn is_subscribed(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Returns which of `candidate_ids` the follower is subscribed to.
    async fn subscribed_among(
        &self,
        follower_id: i64,
        candidate_ids: &[i64],
    ) -> Result<HashSet<i64>, AppError>;

    /// Lists followees ordered by id.
    async fn followees(
        &self,
        follower_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, AppError>;

    /// Counts followees.
    async fn count_followees(&self, follower_id: i64) -> Result<i64, AppError>;
}
