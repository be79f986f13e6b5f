//! Depth-first resolution over language plugins


use indexmap::{IndexMap, IndexSet};
use paxly_config::Manifest;
use paxly_core::types::Dependency;
use paxly_plugin::{LanguagePlugin, PluginRegistry, PluginResult};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::diagnostics::{Lookup, Requirer, ResolveError};
use crate::graph::ResolutionGraph;
use crate::report::{PackageKey, Resolution, ResolvedPackage};
use crate::select::VersionSelector;
use crate::ResolverResult;

/// Default limit on a single plugin lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Limit on each plugin call; `None` waits indefinitely
    pub lookup_timeout: Option<Duration>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            lookup_timeout: Some(DEFAULT_LOOKUP_TIMEOUT),
        }
    }
}

/// Resolves one manifest environment against a plugin registry
#[derive(Debug, Clone)]
pub struct Resolver<'r> {
    registry: &'r PluginRegistry,
    options: ResolverOptions,
}

/// Mutable state of a single run, discarded when the run ends
#[derive(Default)]
struct RunState {
    /// At most one version per package name, whichever language asked first
    resolved: IndexMap<String, ResolvedPackage>,
    /// Package names on the current DFS path, outermost first
    in_progress: IndexSet<String>,
    graph: ResolutionGraph,
}

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = ResolverResult<()>> + Send + 'a>>;

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self {
            registry,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve every dependency declared in `environment`, transitively.
    ///
    /// Languages and constraints are checked for the whole environment before
    /// any plugin is called. Resolution then stops at the first failure.
    pub async fn resolve_dependencies(&self, manifest: &Manifest, environment: &str) -> ResolverResult<Resolution> {
        let start = Instant::now();

        let section = manifest
            .environment(environment)
            .ok_or_else(|| ResolveError::EnvironmentNotFound {
                environment: environment.to_string(),
                available: manifest.environment_names().map(String::from).collect(),
            })?;

        for (language, dependency) in section.declarations() {
            if !self.registry.contains(language) {
                return Err(ResolveError::UnknownLanguage {
                    language: language.to_string(),
                    package: dependency.name.clone(),
                });
            }
        }

        for (language, dependency) in section.declarations() {
            if let Err(source) = dependency.parse_constraint() {
                return Err(ResolveError::InvalidConstraint {
                    language: language.to_string(),
                    package: dependency.name.clone(),
                    constraint: dependency.constraint.clone(),
                    required_by: Requirer::Manifest,
                    source,
                });
            }
        }

        info!(
            "Resolving {} declared dependencies for environment '{}'",
            section.len(),
            environment
        );

        let mut state = RunState::default();
        let mut roots = Vec::new();

        for (language, dependency) in section.declarations() {
            let plugin = self
                .registry
                .get(language)
                .ok_or_else(|| ResolveError::UnknownLanguage {
                    language: language.to_string(),
                    package: dependency.name.clone(),
                })?;

            let key = PackageKey::new(language, &dependency.name);
            if !roots.contains(&key) {
                roots.push(key);
            }

            self.resolve_one(&mut state, plugin.as_ref(), language, dependency.clone(), Requirer::Manifest)
                .await?;
        }

        let elapsed = start.elapsed();
        info!(
            "Resolved {} packages for '{}' in {:.2}ms",
            state.resolved.len(),
            environment,
            elapsed.as_secs_f64() * 1000.0
        );

        Ok(Resolution::new(
            environment.to_string(),
            state.resolved,
            roots,
            state.graph,
            elapsed,
        ))
    }

    /// Resolve `dependency` and everything below it
    fn resolve_one<'a>(
        &'a self,
        state: &'a mut RunState,
        plugin: &'a dyn LanguagePlugin,
        language: &'a str,
        dependency: Dependency,
        required_by: Requirer,
    ) -> ResolveFuture<'a> {
        Box::pin(async move {
            let constraint = dependency
                .parse_constraint()
                .map_err(|source| ResolveError::InvalidConstraint {
                    language: language.to_string(),
                    package: dependency.name.clone(),
                    constraint: dependency.constraint.clone(),
                    required_by: required_by.clone(),
                    source,
                })?;

            let key = dependency.name.clone();
            let parent = required_by.package_name();

            if let Some(start) = state.in_progress.get_index_of(&key) {
                let mut path: Vec<String> = state.in_progress.iter().skip(start).cloned().collect();
                path.push(key.clone());

                return Err(ResolveError::CyclicDependency {
                    language: language.to_string(),
                    package: key,
                    path,
                });
            }

            if let Some(existing) = state.resolved.get(&key) {
                if !constraint.satisfies(&existing.version) {
                    return Err(ResolveError::VersionConflict {
                        language: language.to_string(),
                        package: key,
                        resolved: existing.published.clone(),
                        resolved_constraint: existing.constraint.clone(),
                        resolved_by: existing.required_by.clone(),
                        constraint: dependency.constraint,
                        required_by,
                    });
                }

                debug!(
                    "{} already resolved to {} by {}, satisfies {}",
                    key, existing.published, existing.language, constraint
                );
                if let Some(parent) = parent {
                    state.graph.add_requirement(parent, &key, &dependency.constraint);
                }
                return Ok(());
            }

            state.in_progress.insert(key.clone());

            let outcome = async {
                let published = self
                    .lookup(language, &dependency.name, Lookup::Versions, plugin.list_available_versions(&dependency.name))
                    .await?;

                let selector = VersionSelector::from_published(&published);
                if !selector.skipped().is_empty() {
                    warn!(
                        "Skipping unparseable versions of {}:{}: {}",
                        language,
                        key,
                        selector.skipped().join(", ")
                    );
                }

                if selector.is_empty() && !published.is_empty() {
                    return Err(ResolveError::InvalidVersion {
                        language: language.to_string(),
                        package: dependency.name.clone(),
                        available: published,
                    });
                }

                let selected = match selector.select_latest(&constraint) {
                    Some(candidate) => candidate.clone(),
                    None => {
                        return Err(ResolveError::NoCompatibleVersion {
                            language: language.to_string(),
                            package: dependency.name.clone(),
                            constraint: dependency.constraint.clone(),
                            required_by: required_by.clone(),
                            available: published,
                        })
                    }
                };

                debug!(
                    "Selected {}:{}@{} for {} ({})",
                    language, key, selected.raw, constraint, required_by
                );

                state.resolved.insert(
                    key.clone(),
                    ResolvedPackage {
                        language: language.to_string(),
                        name: dependency.name.clone(),
                        version: selected.version,
                        published: selected.raw.clone(),
                        constraint: dependency.constraint.clone(),
                        required_by: required_by.clone(),
                    },
                );
                state.graph.add_package(&key);
                if let Some(parent) = parent {
                    state.graph.add_requirement(parent, &key, &dependency.constraint);
                }

                let children = self
                    .lookup(
                        language,
                        &dependency.name,
                        Lookup::Dependencies {
                            version: selected.raw.clone(),
                        },
                        plugin.list_direct_dependencies(&dependency.name, &selected.raw),
                    )
                    .await?;

                for child in children {
                    let requirer = Requirer::package(&dependency.name, &selected.raw);
                    self.resolve_one(&mut *state, plugin, language, child, requirer).await?;
                }

                Ok::<(), ResolveError>(())
            }
            .await;

            state.in_progress.shift_remove(&key);
            outcome
        })
    }

    /// Run one plugin call under the configured timeout
    async fn lookup<T, F>(&self, language: &str, package: &str, operation: Lookup, call: F) -> ResolverResult<T>
    where
        F: Future<Output = PluginResult<T>>,
    {
        let result = match self.options.lookup_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Plugin '{}' timed out {} for '{}'", language, operation, package);
                    return Err(ResolveError::LookupTimeout {
                        language: language.to_string(),
                        package: package.to_string(),
                        operation,
                        timeout: limit,
                    });
                }
            },
            None => call.await,
        };

        result.map_err(|source| ResolveError::LookupError {
            language: language.to_string(),
            package: package.to_string(),
            operation,
            source,
        })
    }
}
