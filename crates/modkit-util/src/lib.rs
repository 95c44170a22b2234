//! Shared utilities for modkit.
//!
//! This crate provides the cross-cutting concerns used by the other modkit
//! crates: the unified error type, filesystem helpers for reading
//! registry snapshots and configuration files, and status-line output.

pub mod errors;
pub mod fs;
pub mod status;
