//! Core data types for modkit.
//!
//! This crate defines the values the relationship engine works over:
//! module versions, game versions and compatibility criteria, module
//! records and their relationship descriptors, the in-memory registry
//! snapshot, and the user's global configuration.
//!
//! Nothing here performs network I/O; registries are loaded from local
//! JSON snapshots.

pub mod config;
pub mod game_version;
pub mod module;
pub mod registry;
pub mod relationship;
pub mod stability;
pub mod version;
