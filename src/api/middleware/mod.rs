//! HTTP middleware for request processing and protection.
//!
//! Provides caller identification, rate limiting, and observability middleware.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
