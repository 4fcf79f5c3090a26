//! User entity.

use chrono::{DateTime, Utc};

/// A registered account.
///
/// The password hash is deliberately not part of this struct; it is only read
/// through [`crate::domain::repositories::UserRepository::password_hash`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Stored media path of the avatar, relative to the media root.
    pub avatar: Option<String>,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// Input data for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}
