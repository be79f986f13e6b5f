//! Rust adapter: crates.io sparse index for lookups, cargo for management

use async_trait::async_trait;
use dashmap::DashMap;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};
use std::sync::Arc;
use tracing::{debug, info};

use super::caret_edge;
use crate::api::{LanguagePlugin, PackageIndex};
use crate::client::{CratesIndexClient, IndexEntry};
use crate::executor::{CommandExecutor, ToolCommand};
use crate::{PluginError, PluginResult};

/// Rust plugin backed by the crates.io sparse index and `cargo`
#[derive(Debug, Clone)]
pub struct RustPlugin {
    client: CratesIndexClient,
    executor: Arc<dyn CommandExecutor>,
    /// Index files fetched during this process, keyed by crate name
    entries: Arc<DashMap<String, Arc<Vec<IndexEntry>>>>,
}

impl RustPlugin {
    pub fn new(client: CratesIndexClient, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            client,
            executor,
            entries: Arc::new(DashMap::new()),
        }
    }

    async fn entries(&self, name: &str) -> PluginResult<Arc<Vec<IndexEntry>>> {
        if let Some(entries) = self.entries.get(name) {
            return Ok(entries.clone());
        }

        let fetched = Arc::new(self.client.fetch_entries(name).await?);
        self.entries.insert(name.to_string(), fetched.clone());
        Ok(fetched)
    }

    fn cargo(&self) -> ToolCommand {
        ToolCommand::new("cargo")
    }
}

#[async_trait]
impl PackageIndex for RustPlugin {
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>> {
        let entries = self.entries(name).await?;
        Ok(entries
            .iter()
            .filter(|entry| !entry.yanked)
            .map(|entry| entry.vers.clone())
            .collect())
    }

    async fn list_direct_dependencies(&self, name: &str, version: &str) -> PluginResult<Vec<Dependency>> {
        let entries = self.entries(name).await?;
        let entry = entries.iter().find(|entry| entry.vers == version).ok_or_else(|| PluginError::Lookup {
            name: name.to_string(),
            message: format!("version {} is not in the index", version),
        })?;

        let dependent = format!("{}@{}", name, version);
        Ok(entry
            .deps
            .iter()
            .filter(|dep| dep.is_normal() && !dep.optional)
            .filter_map(|dep| caret_edge(&dependent, dep.crate_name(), &dep.req, true))
            .collect())
    }
}

#[async_trait]
impl LanguagePlugin for RustPlugin {
    fn language(&self) -> &str {
        "rust"
    }

    async fn initialize(&self) -> PluginResult<()> {
        self.executor.run(&self.cargo().arg("--version")).await?;
        Ok(())
    }

    async fn install(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        info!("Adding {} crate(s)", packages.len());
        let command = self.cargo().arg("add").args(packages.iter().map(|p| p.to_string()));
        self.executor.run(&command).await?;
        Ok(())
    }

    async fn update(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        // cargo add rewrites the requirement of an existing dependency
        self.install(packages).await
    }

    async fn remove(&self, name: &str) -> PluginResult<()> {
        self.executor.run(&self.cargo().args(["remove", name])).await?;
        Ok(())
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        let stdout = self
            .executor
            .run(&self.cargo().args(["tree", "--depth", "1", "--prefix", "none"]))
            .await?;
        Ok(parse_cargo_tree(&stdout))
    }
}

/// Direct dependencies from `cargo tree --depth 1 --prefix none`; the first line is the root crate
fn parse_cargo_tree(output: &str) -> Vec<InstalledPackage> {
    let mut installed: Vec<InstalledPackage> = Vec::new();

    for line in output.lines().skip(1) {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(version)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(version) = version.strip_prefix('v') else {
            debug!("Skipping cargo tree line '{}'", line);
            continue;
        };
        if !installed.iter().any(|p| p.name == name) {
            installed.push(InstalledPackage::new(name, version));
        }
    }

    installed
}
