//! Uploaded image handling.
//!
//! Recipe images and avatars arrive as base64 text inside JSON payloads. They are
//! decoded by [`decode_image`] and written by a [`MediaStorage`] implementation,
//! which returns a path relative to the media root. Stored files are served under
//! `/media/`.

mod image;
mod local;

pub use image::{DecodedImage, decode_field, decode_image};
pub use local::LocalMediaStorage;

use async_trait::async_trait;

use crate::error::AppError;

/// Directory for recipe images, relative to the media root.
pub const RECIPE_IMAGE_DIR: &str = "recipes/images";

/// Directory for user avatars, relative to the media root.
pub const AVATAR_DIR: &str = "users/avatars";

/// Storage for decoded images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Writes the image under `dir` with a fresh file name and returns its
    /// relative path (e.g. `recipes/images/<uuid>.png`).
    async fn save(&self, dir: &str, image: DecodedImage) -> Result<String, AppError>;

    /// Removes a stored file. Missing files are ignored.
    async fn delete(&self, path: &str) -> Result<(), AppError>;

    /// Public URL of a stored file.
    fn url(&self, path: &str) -> String;
}
