//! Test support module
//!
//! Shared fixtures and catalog wrappers for the integration tests.

pub mod helpers;

// Re-export rstest fixtures for convenient use in tests
pub mod fixtures;
