//! In-memory plugin for tests

use async_trait::async_trait;
use dashmap::DashMap;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::{LanguagePlugin, PackageIndex, PLUGIN_API_VERSION};
use crate::{PluginError, PluginResult};

pub use crate::executor::ScriptedExecutor;

/// A scripted package index that records every call made to it
#[derive(Debug)]
pub struct FakePlugin {
    language: String,
    api_version: String,
    versions: HashMap<String, Vec<String>>,
    edges: HashMap<(String, String), Vec<Dependency>>,
    version_failures: HashMap<String, String>,
    edge_failures: HashMap<String, String>,
    delay: Option<Duration>,
    version_calls: DashMap<String, usize>,
    edge_calls: DashMap<(String, String), usize>,
    total_calls: AtomicUsize,
    installed: Mutex<Vec<PinnedPackage>>,
}

impl FakePlugin {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            api_version: PLUGIN_API_VERSION.to_string(),
            versions: HashMap::new(),
            edges: HashMap::new(),
            version_failures: HashMap::new(),
            edge_failures: HashMap::new(),
            delay: None,
            version_calls: DashMap::new(),
            edge_calls: DashMap::new(),
            total_calls: AtomicUsize::new(0),
            installed: Mutex::new(Vec::new()),
        }
    }

    /// Publish `versions` of `name`
    pub fn with_package(mut self, name: &str, versions: &[&str]) -> Self {
        self.versions
            .insert(name.to_string(), versions.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Declare the direct dependencies of `name` at `version`
    pub fn with_dependencies(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        self.edges.insert(
            (name.to_string(), version.to_string()),
            deps.iter().map(|(n, c)| Dependency::new(*n, *c)).collect(),
        );
        self
    }

    /// Make version lookups for `name` fail
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.version_failures.insert(name.to_string(), message.to_string());
        self
    }

    /// Make dependency lookups for any version of `name` fail
    pub fn with_dependency_failure(mut self, name: &str, message: &str) -> Self {
        self.edge_failures.insert(name.to_string(), message.to_string());
        self
    }

    /// Sleep this long before answering any lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Number of `list_available_versions` calls for `name`
    pub fn version_lookups(&self, name: &str) -> usize {
        self.version_calls.get(name).map(|count| *count).unwrap_or(0)
    }

    /// Number of `list_direct_dependencies` calls for `name` at `version`
    pub fn dependency_lookups(&self, name: &str, version: &str) -> usize {
        self.edge_calls
            .get(&(name.to_string(), version.to_string()))
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Lookups of either kind made so far
    pub fn total_lookups(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Packages passed to `install` or `update`, minus removed ones
    pub fn installed(&self) -> Vec<PinnedPackage> {
        self.installed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record_install(&self, packages: &[PinnedPackage]) {
        let mut installed = self.installed.lock().unwrap_or_else(|e| e.into_inner());
        for package in packages {
            installed.retain(|p| p.name != package.name);
            installed.push(package.clone());
        }
    }
}

#[async_trait]
impl PackageIndex for FakePlugin {
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.version_calls.entry(name.to_string()).or_insert(0) += 1;
        self.pause().await;

        if let Some(message) = self.version_failures.get(name) {
            return Err(PluginError::Lookup {
                name: name.to_string(),
                message: message.clone(),
            });
        }

        Ok(self.versions.get(name).cloned().unwrap_or_default())
    }

    async fn list_direct_dependencies(&self, name: &str, version: &str) -> PluginResult<Vec<Dependency>> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .edge_calls
            .entry((name.to_string(), version.to_string()))
            .or_insert(0) += 1;
        self.pause().await;

        if let Some(message) = self.edge_failures.get(name) {
            return Err(PluginError::Lookup {
                name: name.to_string(),
                message: message.clone(),
            });
        }

        Ok(self
            .edges
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl LanguagePlugin for FakePlugin {
    fn language(&self) -> &str {
        &self.language
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }

    async fn install(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        self.record_install(packages);
        Ok(())
    }

    async fn update(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        self.record_install(packages);
        Ok(())
    }

    async fn remove(&self, name: &str) -> PluginResult<()> {
        self.installed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|p| p.name != name);
        Ok(())
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        Ok(self
            .installed()
            .into_iter()
            .map(|p| InstalledPackage::new(p.name, p.version))
            .collect())
    }
}
