//! Version listing cache with TTL support

use async_trait::async_trait;
use dashmap::DashMap;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};
use std::time::{Duration, SystemTime};
use tracing::trace;

use crate::api::{LanguagePlugin, PackageIndex};
use crate::PluginResult;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached version strings
    pub versions: Vec<String>,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn with_ttl(versions: Vec<String>, ttl: Duration) -> Self {
        Self {
            versions,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }

    pub fn age(&self) -> Option<Duration> {
        self.stored_at.elapsed().ok()
    }
}

/// Memoises `list_available_versions` of the wrapped index.
///
/// Only the published version lists are cached; resolved versions never are.
#[derive(Debug)]
pub struct CachedIndex<P> {
    inner: P,
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl<P> CachedIndex<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Fresh cached versions for `name`, dropping a stale entry
    pub fn get(&self, name: &str) -> Option<Vec<String>> {
        let fresh = self.entries.get(name).map(|entry| entry.is_fresh())?;
        if fresh {
            self.entries.get(name).map(|entry| entry.versions.clone())
        } else {
            self.entries.remove(name);
            None
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let fresh_entries = self.entries.iter().filter(|entry| entry.is_fresh()).count();
        CacheStats {
            total_entries: self.entries.len(),
            fresh_entries,
            stale_entries: self.entries.len().saturating_sub(fresh_entries),
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remove stale entries
    pub fn cleanup(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh());
        before.saturating_sub(self.entries.len())
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
}

#[async_trait]
impl<P: PackageIndex> PackageIndex for CachedIndex<P> {
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>> {
        if let Some(versions) = self.get(name) {
            trace!("Version cache hit for '{}'", name);
            return Ok(versions);
        }

        let versions = self.inner.list_available_versions(name).await?;
        self.entries
            .insert(name.to_string(), CacheEntry::with_ttl(versions.clone(), self.ttl));
        Ok(versions)
    }

    async fn list_direct_dependencies(&self, name: &str, version: &str) -> PluginResult<Vec<Dependency>> {
        self.inner.list_direct_dependencies(name, version).await
    }
}

#[async_trait]
impl<P: LanguagePlugin> LanguagePlugin for CachedIndex<P> {
    fn language(&self) -> &str {
        self.inner.language()
    }

    fn api_version(&self) -> &str {
        self.inner.api_version()
    }

    async fn initialize(&self) -> PluginResult<()> {
        self.inner.initialize().await
    }

    async fn install(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        self.inner.install(packages).await
    }

    async fn update(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        self.inner.update(packages).await
    }

    async fn remove(&self, name: &str) -> PluginResult<()> {
        self.inner.remove(name).await
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        self.inner.list_installed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlugin;

    fn fake() -> FakePlugin {
        FakePlugin::new("python").with_package("requests", &["2.28.0", "2.31.0"])
    }

    #[test]
    fn test_cache_entry_freshness() {
        let entry = CacheEntry::with_ttl(vec!["1.0.0".to_string()], Duration::from_secs(60));
        assert!(entry.is_fresh());
        assert!(entry.age().unwrap() < Duration::from_secs(1));

        let expired = CacheEntry::with_ttl(Vec::new(), Duration::ZERO);
        assert!(!expired.is_fresh());
    }

    #[test]
    fn test_versions_are_memoised() {
        let cached = CachedIndex::new(fake(), Duration::from_secs(60));

        let first = tokio_test::block_on(cached.list_available_versions("requests")).unwrap();
        let second = tokio_test::block_on(cached.list_available_versions("requests")).unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner().version_lookups("requests"), 1);
        assert_eq!(cached.stats().fresh_entries, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_refetch() {
        let cached = CachedIndex::new(fake(), Duration::ZERO);

        cached.list_available_versions("requests").await.unwrap();
        cached.list_available_versions("requests").await.unwrap();

        assert_eq!(cached.inner().version_lookups("requests"), 2);
        assert_eq!(cached.cleanup(), 1);
        assert_eq!(cached.stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_dependencies_pass_through() {
        let plugin = fake().with_dependencies("requests", "2.31.0", &[("idna", "^3.4")]);
        let cached = CachedIndex::new(plugin, Duration::from_secs(60));

        cached.list_direct_dependencies("requests", "2.31.0").await.unwrap();
        cached.list_direct_dependencies("requests", "2.31.0").await.unwrap();

        assert_eq!(cached.inner().dependency_lookups("requests", "2.31.0"), 2);
        assert_eq!(cached.language(), "python");
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cached = CachedIndex::new(fake().with_failure("broken", "registry down"), Duration::from_secs(60));

        assert!(cached.list_available_versions("broken").await.is_err());
        assert!(cached.list_available_versions("broken").await.is_err());
        assert_eq!(cached.inner().version_lookups("broken"), 2);
    }
}
