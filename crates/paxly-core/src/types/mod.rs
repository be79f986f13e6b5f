//! Core data types for Paxly.
//!
//! - Version types for semantic versioning and caret constraints
//! - Dependency declarations as written in the manifest or reported by a plugin
//! - Package records exchanged with language plugins

pub mod dependency;
pub mod package;
pub mod version;

// Re-export all public types
pub use dependency::Dependency;
pub use package::{InstalledPackage, PinnedPackage};
pub use version::{Constraint, Version, VersionError};
