//! Python adapter driving pip

use async_trait::async_trait;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{LanguagePlugin, PackageIndex};
use crate::executor::{CommandExecutor, ToolCommand};
use crate::{PluginError, PluginResult};

/// Python plugin backed by `pip`
#[derive(Debug, Clone)]
pub struct PythonPlugin {
    executor: Arc<dyn CommandExecutor>,
    pip: String,
}

impl PythonPlugin {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            pip: "pip".to_string(),
        }
    }

    /// Use a specific pip executable, e.g. one inside a virtualenv
    pub fn with_pip(mut self, pip: impl Into<String>) -> Self {
        self.pip = pip.into();
        self
    }

    fn pip(&self) -> ToolCommand {
        ToolCommand::new(&self.pip)
    }

    fn pinned_args(packages: &[PinnedPackage]) -> impl Iterator<Item = String> + '_ {
        packages.iter().map(|p| format!("{}=={}", p.name, p.version))
    }
}

#[async_trait]
impl PackageIndex for PythonPlugin {
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>> {
        let command = self.pip().args(["index", "versions", name]);
        let output = self.executor.output(&command).await?;

        if !output.is_success() && output.stderr.contains("No matching distribution") {
            debug!("No distribution found for '{}'", name);
            return Ok(Vec::new());
        }

        // Older pips only list versions in the error of a failed install
        match parse_available_versions(&output.stdout).or_else(|| parse_available_versions(&output.stderr)) {
            Some(versions) => Ok(versions),
            None if output.is_success() => Err(PluginError::parse(command.to_string(), "no version list in output")),
            None => output.into_result(&command).map(|_| Vec::new()),
        }
    }

    async fn list_direct_dependencies(&self, _name: &str, _version: &str) -> PluginResult<Vec<Dependency>> {
        // pip resolves transitive requirements itself
        Ok(Vec::new())
    }
}

#[async_trait]
impl LanguagePlugin for PythonPlugin {
    fn language(&self) -> &str {
        "python"
    }

    async fn initialize(&self) -> PluginResult<()> {
        self.executor.run(&self.pip().arg("--version")).await?;
        Ok(())
    }

    async fn install(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        info!("Installing {} Python package(s)", packages.len());
        let command = self.pip().arg("install").args(Self::pinned_args(packages));
        self.executor.run(&command).await?;
        Ok(())
    }

    async fn update(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let command = self.pip().args(["install", "--upgrade"]).args(Self::pinned_args(packages));
        self.executor.run(&command).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> PluginResult<()> {
        self.executor.run(&self.pip().args(["uninstall", "-y", name])).await?;
        Ok(())
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        let stdout = self.executor.run(&self.pip().arg("freeze")).await?;
        Ok(parse_freeze(&stdout))
    }
}

/// Extract versions from `Available versions: a, b` or `(from versions: a, b)`
fn parse_available_versions(output: &str) -> Option<Vec<String>> {
    let list = output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Available versions:"))
        .or_else(|| {
            let start = output.find("(from versions:")? + "(from versions:".len();
            let end = output[start..].find(')')?;
            Some(&output[start..start + end])
        })?;

    Some(
        list.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "none")
            .map(pad_release)
            .collect(),
    )
}

/// Pad a one or two segment release (`2`, `2.28`) to three segments
fn pad_release(version: &str) -> String {
    let segments: Vec<&str> = version.split('.').collect();
    let numeric = segments.iter().all(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));

    if numeric && segments.len() < 3 {
        let mut padded = segments.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        padded.resize(3, "0".to_string());
        padded.join(".")
    } else {
        version.to_string()
    }
}

fn parse_freeze(output: &str) -> Vec<InstalledPackage> {
    output
        .lines()
        .filter_map(|line| line.trim().split_once("=="))
        .map(|(name, version)| InstalledPackage::new(name.trim(), version.trim()))
        .collect()
}
