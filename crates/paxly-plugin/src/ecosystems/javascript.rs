//! JavaScript adapter driving npm

use async_trait::async_trait;
use indexmap::IndexMap;
use paxly_core::types::{Dependency, InstalledPackage, PinnedPackage};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::caret_edge;
use crate::api::{LanguagePlugin, PackageIndex};
use crate::executor::{CommandExecutor, ToolCommand, ToolOutput};
use crate::{PluginError, PluginResult};

/// JavaScript plugin backed by `npm`
#[derive(Debug, Clone)]
pub struct JavaScriptPlugin {
    executor: Arc<dyn CommandExecutor>,
}

/// `npm view --json` prints a bare string when there is a single value
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct NpmLs {
    #[serde(default)]
    dependencies: IndexMap<String, NpmLsEntry>,
}

#[derive(Deserialize)]
struct NpmLsEntry {
    #[serde(default)]
    version: Option<String>,
}

impl JavaScriptPlugin {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    fn npm(&self) -> ToolCommand {
        ToolCommand::new("npm")
    }

    /// Run `npm view`, mapping a missing package to `None`
    async fn view(&self, command: &ToolCommand) -> PluginResult<Option<String>> {
        let output: ToolOutput = self.executor.output(command).await?;
        if !output.is_success() && output.stderr.contains("E404") {
            return Ok(None);
        }
        output.into_result(command).map(Some)
    }
}

#[async_trait]
impl PackageIndex for JavaScriptPlugin {
    async fn list_available_versions(&self, name: &str) -> PluginResult<Vec<String>> {
        let command = self.npm().args(["view", name, "versions", "--json"]);
        let Some(stdout) = self.view(&command).await? else {
            debug!("Package '{}' not found in npm registry", name);
            return Ok(Vec::new());
        };

        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&stdout) {
            Ok(OneOrMany::One(version)) => Ok(vec![version]),
            Ok(OneOrMany::Many(versions)) => Ok(versions),
            Err(e) => Err(PluginError::parse(command.to_string(), e.to_string())),
        }
    }

    async fn list_direct_dependencies(&self, name: &str, version: &str) -> PluginResult<Vec<Dependency>> {
        let spec = format!("{}@{}", name, version);
        let command = self.npm().args(["view", spec.as_str(), "dependencies", "--json"]);
        let stdout = self.view(&command).await?.unwrap_or_default();

        // No output at all means no dependencies
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }

        let ranges: IndexMap<String, String> =
            serde_json::from_str(&stdout).map_err(|e| PluginError::parse(command.to_string(), e.to_string()))?;

        Ok(ranges
            .iter()
            .filter_map(|(dep, range)| caret_edge(&spec, dep, range, false))
            .collect())
    }
}

#[async_trait]
impl LanguagePlugin for JavaScriptPlugin {
    fn language(&self) -> &str {
        "javascript"
    }

    async fn initialize(&self) -> PluginResult<()> {
        self.executor.run(&self.npm().arg("--version")).await?;
        Ok(())
    }

    async fn install(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        info!("Installing {} JavaScript package(s)", packages.len());
        let command = self.npm().arg("install").args(packages.iter().map(|p| p.to_string()));
        self.executor.run(&command).await?;
        Ok(())
    }

    async fn update(&self, packages: &[PinnedPackage]) -> PluginResult<()> {
        // npm install moves an existing package to the requested version
        self.install(packages).await
    }

    async fn remove(&self, name: &str) -> PluginResult<()> {
        self.executor.run(&self.npm().args(["uninstall", name])).await?;
        Ok(())
    }

    async fn list_installed(&self) -> PluginResult<Vec<InstalledPackage>> {
        let command = self.npm().args(["ls", "--json", "--depth=0"]);
        let output = self.executor.output(&command).await?;

        // npm ls exits non-zero on peer warnings but still prints the tree
        let tree: NpmLs = match serde_json::from_str(&output.stdout) {
            Ok(tree) => tree,
            Err(e) if output.is_success() => return Err(PluginError::parse(command.to_string(), e.to_string())),
            Err(_) => return output.into_result(&command).map(|_| Vec::new()),
        };

        Ok(tree
            .dependencies
            .into_iter()
            .filter_map(|(name, entry)| entry.version.map(|version| InstalledPackage::new(name, version)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScriptedExecutor;

    fn plugin(executor: ScriptedExecutor) -> (JavaScriptPlugin, Arc<ScriptedExecutor>) {
        let executor = Arc::new(executor);
        (JavaScriptPlugin::new(executor.clone()), executor)
    }

    #[tokio::test]
    async fn test_list_available_versions() {
        let (plugin, _) = plugin(
            ScriptedExecutor::new()
                .respond("npm view express versions --json", ToolOutput::success(r#"["4.17.1","4.18.2","5.0.0-beta.1"]"#))
                .respond("npm view solo versions --json", ToolOutput::success(r#""1.0.0""#)),
        );

        assert_eq!(
            plugin.list_available_versions("express").await.unwrap(),
            vec!["4.17.1", "4.18.2", "5.0.0-beta.1"]
        );
        assert_eq!(plugin.list_available_versions("solo").await.unwrap(), vec!["1.0.0"]);
    }

    #[tokio::test]
    async fn test_missing_package() {
        let (plugin, _) = plugin(ScriptedExecutor::new().respond(
            "npm view nope-nope versions --json",
            ToolOutput::failure(1, "npm ERR! code E404"),
        ));
        assert!(plugin.list_available_versions("nope-nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direct_dependencies_keep_caret_ranges() {
        let (plugin, _) = plugin(
            ScriptedExecutor::new()
                .respond(
                    "npm view express@4.18.2 dependencies --json",
                    ToolOutput::success(r#"{"accepts":"~1.3.8","body-parser":"1.20.1","debug":"^2.6.9","qs":"^6.11.0"}"#),
                )
                .respond("npm view leaf@1.0.0 dependencies --json", ToolOutput::success("")),
        );

        let deps = plugin.list_direct_dependencies("express", "4.18.2").await.unwrap();
        assert_eq!(deps, vec![Dependency::new("debug", "^2.6.9"), Dependency::new("qs", "^6.11.0")]);
        assert!(plugin.list_direct_dependencies("leaf", "1.0.0").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbled_output_is_parse_error() {
        let (plugin, _) = plugin(ScriptedExecutor::new().respond("npm view x versions --json", ToolOutput::success("{oops")));
        assert!(matches!(plugin.list_available_versions("x").await, Err(PluginError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_install_and_list() {
        let (plugin, executor) = plugin(
            ScriptedExecutor::new()
                .respond("npm install express@4.18.2", ToolOutput::success(""))
                .respond(
                    "npm ls --json --depth=0",
                    ToolOutput::success(r#"{"name":"app","dependencies":{"express":{"version":"4.18.2"}}}"#),
                ),
        );

        plugin.install(&[PinnedPackage::new("express", "4.18.2")]).await.unwrap();
        let installed = plugin.list_installed().await.unwrap();

        assert_eq!(installed, vec![InstalledPackage::new("express", "4.18.2")]);
        assert_eq!(executor.history()[0], "npm install express@4.18.2");
    }
}
