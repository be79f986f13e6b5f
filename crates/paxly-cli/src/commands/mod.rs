//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking its arguments and a shared
//! [`CommandContext`].

use camino::Utf8PathBuf;
use paxly_config::{ConfigLoader, Manifest, Settings, SettingsLayering};
use paxly_core::error::{PaxlyError, PaxlyResult};
use paxly_plugin::{PluginConfig, PluginRegistry, SystemExecutor};
use paxly_resolver::{Resolution, Resolver, ResolverOptions};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub mod add;
pub mod check;
pub mod init;
pub mod install;
pub mod list;
pub mod remove;
pub mod resolve;
pub mod update;
pub mod version;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub settings: Settings,
    pub registry: PluginRegistry,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Build the context from the layered settings and the built-in plugins
    pub async fn new(cli_overrides: &HashMap<String, String>) -> PaxlyResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| PaxlyError::io("Failed to get current directory", e))?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|e| PaxlyError::validation("cwd", format!("Working directory is not valid UTF-8: {}", e)))?;

        let global = paxly_config::settings::load_global_settings().await?;
        let settings = SettingsLayering::merge(global, &SettingsLayering::collect_env_overrides(), cli_overrides)?;

        let plugin_config = PluginConfig {
            version_cache_ttl: settings.version_cache_ttl(),
            crates_index_url: settings.crates_index_url.clone(),
        };
        let registry = PluginRegistry::builtin(&plugin_config, Arc::new(SystemExecutor::new()))?;

        Ok(Self {
            cwd,
            settings,
            registry,
            output: OutputHandler::new(),
        })
    }

    /// Loader honouring the configured manifest file name
    pub fn loader(&self) -> ConfigLoader {
        ConfigLoader::new(self.cwd.clone()).with_manifest_file(self.settings.manifest_file.clone())
    }

    pub async fn load_manifest(&self) -> PaxlyResult<(Manifest, Utf8PathBuf)> {
        self.loader().load_manifest().await
    }

    /// `--env` if given, else the configured default
    pub fn environment(&self, env: Option<String>) -> String {
        env.unwrap_or_else(|| self.settings.default_environment.clone())
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry).with_options(ResolverOptions {
            lookup_timeout: self.settings.lookup_timeout(),
        })
    }

    /// Resolve `environment` of `manifest`, converting failures for display
    pub async fn resolve(&self, manifest: &Manifest, environment: &str) -> PaxlyResult<Resolution> {
        Ok(self.resolver().resolve_dependencies(manifest, environment).await?)
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> PaxlyResult<()> {
    match command {
        Commands::Init {
            name,
            version,
            description,
            authors,
        } => {
            info!("Initializing project {}", name);
            let args = init::InitArgs {
                name,
                version,
                description,
                authors,
            };
            init::execute(args, ctx).await
        }
        Commands::Add {
            language,
            name,
            version,
            env,
        } => {
            info!("Adding {} dependency {} {}", language, name, version);
            add::execute(&language, &name, &version, env, ctx).await
        }
        Commands::Remove { language, name, env } => {
            info!("Removing {} dependency {}", language, name);
            remove::execute(&language, &name, env, ctx).await
        }
        Commands::Update {
            language,
            name,
            version,
            env,
        } => {
            info!("Updating {} dependency {} to {}", language, name, version);
            update::execute(&language, &name, &version, env, ctx).await
        }
        Commands::Resolve { env, json } => {
            info!("Resolving dependencies (json: {})", json);
            resolve::execute(env, json, ctx).await
        }
        Commands::Install { env } => {
            info!("Installing dependencies");
            install::execute(env, ctx).await
        }
        Commands::List { env } => {
            info!("Listing dependencies");
            list::execute(env, ctx).await
        }
        Commands::Check => {
            info!("Checking manifest");
            check::execute(ctx).await
        }
        Commands::Version => {
            info!("Showing version information");
            version::execute(ctx).await
        }
    }
}
