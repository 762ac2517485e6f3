//! Configuration for the `bead` command
//!
//! Provides types, discovery and loading for `bead.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
