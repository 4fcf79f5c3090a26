//! Utility functions shared across layers.

pub mod password;
pub mod token;
