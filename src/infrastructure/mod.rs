//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and media files.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`media`] - Image decoding and local media storage
//! - [`memory`] - In-process repository backend
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod media;
pub mod memory;
pub mod persistence;
