//! Shared utilities for the storefront workspace
//!
//! This crate provides the pieces every member crate needs:
//!
//! - Configuration loading from YAML files
//! - Shared test utilities (error type, request builders, unique IDs)

pub mod config;

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::generate_unique_id;
