//! Language plugins for Paxly
//!
//! A plugin answers two read-only questions for the resolver (which versions of a
//! package are published, and what a given version depends on) and performs
//! install/update/remove/list against the ecosystem's native package manager.
//!
//! Plugins are registered in an explicit [`PluginRegistry`] built once at startup
//! and handed to the resolver by reference.

pub mod api;
pub mod cache;
pub mod client;
pub mod ecosystems;
pub mod error;
pub mod executor;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export main types
pub use api::{LanguagePlugin, PackageIndex, PLUGIN_API_VERSION};
pub use cache::{CacheEntry, CacheStats, CachedIndex};
pub use client::{CratesIndexClient, IndexDependency, IndexEntry, RetryConfig};
pub use ecosystems::{GoPlugin, JavaScriptPlugin, PythonPlugin, RustPlugin};
pub use error::PluginError;
pub use executor::{CommandExecutor, SystemExecutor, ToolCommand, ToolOutput};
pub use registry::{PluginConfig, PluginRegistry};

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;
