//! Shared test utilities for ratecard integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with temp directories
//! - Builders for submission requests

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
