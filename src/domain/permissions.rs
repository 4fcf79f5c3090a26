//! Request actors and the read/write capability checks.

use serde_json::json;

use crate::domain::entities::User;
use crate::error::AppError;

/// The caller of a request.
#[derive(Debug, Clone, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(User),
}

impl Actor {
    /// Returns the authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::Anonymous => None,
            Actor::User(user) => Some(user),
        }
    }

    /// Returns the authenticated user's id, if any.
    pub fn user_id(&self) -> Option<i64> {
        self.user().map(|u| u.id)
    }

    /// Returns the authenticated user or a `401 Unauthorized` error.
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.user().ok_or_else(|| {
            AppError::unauthorized(
                "Authentication credentials were not provided",
                json!({ "reason": "Authorization header is missing" }),
            )
        })
    }
}

/// Capability checks evaluated per request.
///
/// Reads are public. Writes need an authenticated actor who owns the resource,
/// or a staff account when `staff_can_write_any` is set.
#[derive(Debug, Clone, Copy)]
pub struct Permissions {
    pub staff_can_write_any: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            staff_can_write_any: true,
        }
    }
}

impl Permissions {
    pub fn can_read(&self, _actor: &Actor) -> bool {
        true
    }

    pub fn can_write(&self, actor: &Actor, owner_id: i64) -> bool {
        match actor {
            Actor::Anonymous => false,
            Actor::User(user) => user.id == owner_id || (self.staff_can_write_any && user.is_staff),
        }
    }

    /// Enforces [`Self::can_write`], distinguishing anonymous (401) from
    /// non-owner (403) callers.
    pub fn ensure_can_write(&self, actor: &Actor, owner_id: i64) -> Result<(), AppError> {
        actor.require_user()?;

        if self.can_write(actor, owner_id) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You do not have permission to perform this action",
                json!({ "owner_id": owner_id }),
            ))
        }
    }
}
