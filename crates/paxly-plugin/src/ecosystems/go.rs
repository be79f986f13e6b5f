//! Go adapter driving the go toolchain

use async_trait::async_trait;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};
use std::sync::Arc;
use tracing::info;

use crate::api::{LanguagePlugin, PackageIndex};
use crate::executor::{CommandExecutor, ToolCommand};
use crate::PluginResult;

/// Go plugin backed by `go`
#[derive(Debug, Clone)]
pub struct GoPlugin {
    executor: Arc<dyn CommandExecutor>,
}

impl GoPlugin {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    fn go(&self) -> ToolCommand {
        ToolCommand::new("go")
    }

    async fn get(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let command = self.go().arg("get").args(packages.iter().map(|p| p.to_string()));
        self.executor.run(&command).await?;
        Ok(())
    }
}

#[async_trait]
impl PackageIndex for GoPlugin {
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>> {
        let stdout = self.executor.run(&self.go().args(["list", "-m", "-versions", name])).await?;

        // `<module> v1.0.0 v1.1.0 ...`
        Ok(stdout.split_whitespace().skip(1).map(str::to_string).collect())
    }

    async fn list_direct_dependencies(&self, _name: &str, _version: &str) -> PluginResult<Vec<Dependency>> {
        // Minimal version selection happens inside `go get`
        Ok(Vec::new())
    }
}

#[async_trait]
impl LanguagePlugin for GoPlugin {
    fn language(&self) -> &str {
        "go"
    }

    async fn initialize(&self) -> PluginResult<()> {
        self.executor.run(&self.go().arg("version")).await?;
        Ok(())
    }

    async fn install(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        info!("Fetching {} Go module(s)", packages.len());
        self.get(packages).await
    }

    async fn update(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        self.get(packages).await
    }

    async fn remove(&self, name: &str) -> PluginResult<()> {
        let command = self.go().args(["mod", "edit"]).arg(format!("-droprequire={}", name));
        self.executor.run(&command).await?;
        Ok(())
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        let stdout = self.executor.run(&self.go().args(["list", "-m", "all"])).await?;

        // The main module is listed first, without a version
        Ok(stdout
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                Some(InstalledPackage::new(parts.next()?, parts.next()?))
            })
            .collect())
    }
}
