//! Plugin capability traits

use async_trait::async_trait;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};

use crate::{PluginError, PluginResult};

/// API version every plugin must report to be registered
pub const PLUGIN_API_VERSION: &str = "1.0";

/// Read-only view of an ecosystem's package index.
///
/// These are the only calls the resolver makes outward. Both must be free of
/// side effects visible to the resolver.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Every published version string of `name`. May be empty.
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>>;

    /// One-hop dependency edges declared by `name` at exactly `version`.
    ///
    /// Ecosystems whose native tool resolves transitively may return an empty list.
    async fn list_direct_dependencies(&self, name: &str, version: &str) -> PluginResult<Vec<Dependency>>;
}

/// A language adapter: the package index plus package management operations
#[async_trait]
pub trait LanguagePlugin: PackageIndex {
    /// Language key the plugin is registered under
    fn language(&self) -> &str;

    fn api_version(&self) -> &str {
        PLUGIN_API_VERSION
    }

    /// Check that the ecosystem's tooling is usable
    async fn initialize(&self) -> PluginResult<()> {
        Ok(())
    }

    async fn install(&self, _packages: &[PinnedPackage]) -> PluginResult<()> {
        Err(self.unsupported("install"))
    }

    async fn update(&self, _packages: &[PinnedPackage]) -> PluginResult<()> {
        Err(self.unsupported("update"))
    }

    async fn remove(&self, _name: &str) -> PluginResult<()> {
        Err(self.unsupported("remove"))
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        Err(self.unsupported("list"))
    }

    #[doc(hidden)]
    fn unsupported(&self, operation: &'static str) -> PluginError {
        PluginError::Unsupported {
            language: self.language().to_string(),
            operation,
        }
    }
}
