//! Explicit plugin registry, built once at startup

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::api::{LanguagePlugin, PLUGIN_API_VERSION};
use crate::cache::CachedIndex;
use crate::client::{CratesIndexClient, DEFAULT_INDEX_URL};
use crate::ecosystems::{GoPlugin, JavaScriptPlugin, PythonPlugin, RustPlugin};
use crate::executor::{CommandExecutor, SystemExecutor};
use crate::{PluginError, PluginResult};

/// Settings for the built-in plugins
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// How long version listings are memoised
    pub version_cache_ttl: Duration,
    /// crates.io sparse index base URL
    pub crates_index_url: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            version_cache_ttl: Duration::from_secs(300),
            crates_index_url: DEFAULT_INDEX_URL.to_string(),
        }
    }
}

/// Language key to plugin, in registration order
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Arc<dyn LanguagePlugin>>,
}

impl PluginRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with python, javascript, rust and go using default settings
    pub fn with_builtin_plugins() -> PluginResult<Self> {
        Self::builtin(&PluginConfig::default(), Arc::new(SystemExecutor::new()))
    }

    /// Registry with the built-in plugins, each behind a version-list cache
    pub fn builtin(config: &PluginConfig, executor: Arc<dyn CommandExecutor>) -> PluginResult<Self> {
        let ttl = config.version_cache_ttl;
        let client = CratesIndexClient::with_base_url(config.crates_index_url.clone())?;

        let mut registry = Self::new();
        registry.register(Arc::new(CachedIndex::new(PythonPlugin::new(executor.clone()), ttl)))?;
        registry.register(Arc::new(CachedIndex::new(JavaScriptPlugin::new(executor.clone()), ttl)))?;
        registry.register(Arc::new(CachedIndex::new(RustPlugin::new(client, executor.clone()), ttl)))?;
        registry.register(Arc::new(CachedIndex::new(GoPlugin::new(executor), ttl)))?;
        Ok(registry)
    }

    /// Register a plugin under its language key
    pub fn register(&mut self, plugin: Arc<dyn LanguagePlugin>) -> PluginResult<()> {
        let language = plugin.language().to_string();

        if language.trim().is_empty() {
            return Err(PluginError::Registration {
                language,
                reason: "language key must not be empty".to_string(),
            });
        }

        if plugin.api_version() != PLUGIN_API_VERSION {
            return Err(PluginError::Registration {
                reason: format!(
                    "plugin API version {} does not match required {}",
                    plugin.api_version(),
                    PLUGIN_API_VERSION
                ),
                language,
            });
        }

        if self.plugins.contains_key(&language) {
            return Err(PluginError::Registration {
                language,
                reason: "a plugin is already registered for this language".to_string(),
            });
        }

        debug!("Registered plugin for '{}'", language);
        self.plugins.insert(language, plugin);
        Ok(())
    }

    pub fn get(&self, language: &str) -> Option<&Arc<dyn LanguagePlugin>> {
        self.plugins.get(language)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.plugins.contains_key(language)
    }

    /// Registered language keys, in registration order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn LanguagePlugin>)> {
        self.plugins.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("languages", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlugin;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(FakePlugin::new("python"))).unwrap();
        registry.register(Arc::new(FakePlugin::new("go"))).unwrap();

        assert!(registry.contains("python"));
        assert!(registry.get("cobol").is_none());
        assert_eq!(registry.languages().collect::<Vec<_>>(), vec!["python", "go"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(FakePlugin::new("python"))).unwrap();

        let err = registry.register(Arc::new(FakePlugin::new("python"))).unwrap_err();
        assert!(matches!(err, PluginError::Registration { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_api_version_mismatch_rejected() {
        let mut registry = PluginRegistry::new();
        let plugin = FakePlugin::new("python").with_api_version("2.0");

        let err = registry.register(Arc::new(plugin)).unwrap_err();
        assert!(err.to_string().contains("2.0"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_builtin_plugins() {
        let registry = PluginRegistry::with_builtin_plugins().unwrap();
        assert_eq!(
            registry.languages().collect::<Vec<_>>(),
            vec!["python", "javascript", "rust", "go"]
        );
    }
}
