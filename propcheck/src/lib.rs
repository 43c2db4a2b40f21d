//! propcheck property-based testing library.
//!
//! This is the main entry point for the propcheck library, providing
//! a convenient API for property-based testing in Rust.

pub use propcheck_core::*;

pub use propcheck_core::registry;
