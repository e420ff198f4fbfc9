//! Shared test utilities for the crumbs workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for a scanned root plus a separate state
//!   directory

pub mod tree;

pub use tree::TestTree;
