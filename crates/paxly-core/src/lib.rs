//! # paxly-core
//!
//! Core types shared across all Paxly crates.
//!
//! This crate provides:
//! - `Version` and `Constraint` with caret-range satisfaction checks
//! - `Dependency` declarations and pinned/installed package records
//! - `PaxlyError` for unified error handling
//!
//! ## Architecture
//!
//! - `types`: Core data types (Version, Constraint, Dependency, ...)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{PaxlyError, PaxlyResult};
pub use types::{Constraint, Dependency, InstalledPackage, PinnedPackage, Version, VersionError};
