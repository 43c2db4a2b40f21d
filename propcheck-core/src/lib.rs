//! Core functionality for propcheck property-based testing.
//!
//! This crate provides the building blocks of the engine: deterministic
//! generators, shrinkers, the arbitrary registry, the property monad,
//! and the driver that minimizes failing inputs.

pub mod arbitrary;
pub mod data;
pub mod driver;
pub mod error;
pub mod gen;
pub mod property;
pub mod registry;
pub mod shrink;
pub mod state;

// Re-export the main types. The registry keeps its module path because
// its operations are named for use as `registry::get` / `registry::register`.
pub use arbitrary::*;
pub use data::*;
pub use driver::*;
pub use error::*;
pub use gen::*;
pub use property::*;
pub use shrink::*;
pub use state::*;
