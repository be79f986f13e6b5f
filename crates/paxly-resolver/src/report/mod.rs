//! Successful resolution report

use indexmap::IndexMap;
use paxly_core::types::{PinnedPackage, Version};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::diagnostics::Requirer;
use crate::graph::ResolutionGraph;

/// A root declaration: the language declaring a package and the package name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageKey {
    pub language: String,
    pub name: String,
}

impl PackageKey {
    pub fn new(language: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            name: name.into(),
        }
    }
}

/// One package of the transitive closure with the version chosen for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPackage {
    /// Language whose plugin selected the version
    pub language: String,
    pub name: String,
    pub version: Version,
    /// Version string as published, passed back to the plugin for installs
    pub published: String,
    /// Constraint of the requirement that selected this version
    pub constraint: String,
    pub required_by: Requirer,
}

impl ResolvedPackage {
    pub fn pinned(&self) -> PinnedPackage {
        PinnedPackage::new(&self.name, &self.published)
    }
}

/// A complete, consistent version assignment for one environment
#[derive(Debug, Clone)]
pub struct Resolution {
    environment: String,
    /// Keyed by package name, in the order packages were resolved
    packages: IndexMap<String, ResolvedPackage>,
    roots: Vec<PackageKey>,
    graph: ResolutionGraph,
    elapsed: Duration,
}

/// Serializable view of a [`Resolution`]
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionSummary<'a> {
    pub environment: &'a str,
    pub package_count: usize,
    pub requirement_count: usize,
    pub elapsed_ms: u64,
    pub packages: Vec<&'a ResolvedPackage>,
}

impl Resolution {
    pub(crate) fn new(
        environment: String,
        packages: IndexMap<String, ResolvedPackage>,
        roots: Vec<PackageKey>,
        graph: ResolutionGraph,
        elapsed: Duration,
    ) -> Self {
        Self {
            environment,
            packages,
            roots,
            graph,
            elapsed,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.get(name)
    }

    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.get(name).map(|p| &p.version)
    }

    /// Every resolved package, in resolution order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.values()
    }

    pub fn for_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a ResolvedPackage> + 'a {
        self.iter().filter(move |p| p.language == language)
    }

    /// Packages declared directly in the environment, in manifest order
    pub fn roots(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.roots.iter().filter_map(|key| self.packages.get(&key.name))
    }

    /// Packages that require `name`
    pub fn dependents_of(&self, name: &str) -> Vec<&ResolvedPackage> {
        self.graph
            .dependents(name)
            .into_iter()
            .filter_map(|dependent| self.packages.get(dependent))
            .collect()
    }

    /// Package name -> published version
    pub fn to_version_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|package| (package.name.clone(), package.published.clone()))
            .collect()
    }

    /// Declared packages pinned to their resolved versions, grouped by the
    /// declaring language
    pub fn install_plan(&self) -> IndexMap<String, Vec<PinnedPackage>> {
        let mut plan: IndexMap<String, Vec<PinnedPackage>> = IndexMap::new();
        for key in &self.roots {
            if let Some(package) = self.packages.get(&key.name) {
                plan.entry(key.language.clone()).or_default().push(package.pinned());
            }
        }
        plan
    }

    pub fn graph(&self) -> &ResolutionGraph {
        &self.graph
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn summary(&self) -> ResolutionSummary<'_> {
        ResolutionSummary {
            environment: &self.environment,
            package_count: self.packages.len(),
            requirement_count: self.graph.requirement_count(),
            elapsed_ms: self.elapsed.as_millis() as u64,
            packages: self.packages.values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(language: &str, name: &str, version: &str, required_by: Requirer) -> ResolvedPackage {
        ResolvedPackage {
            language: language.to_string(),
            name: name.to_string(),
            version: Version::parse(version).unwrap(),
            published: version.to_string(),
            constraint: "^1.0".to_string(),
            required_by,
        }
    }

    fn sample() -> Resolution {
        let app = resolved("javascript", "app", "1.0.0", Requirer::Manifest);
        let lib = resolved("javascript", "lib", "1.4.0", Requirer::package("app", "1.0.0"));
        let req = resolved("python", "requests", "1.2.0", Requirer::Manifest);

        let mut graph = ResolutionGraph::new();
        graph.add_requirement("app", "lib", "^1.0");
        graph.add_package("requests");

        let roots = vec![
            PackageKey::new("javascript", "app"),
            PackageKey::new("python", "requests"),
            PackageKey::new("rust", "requests"),
        ];
        let packages = [app, lib, req].into_iter().map(|p| (p.name.clone(), p)).collect();
        Resolution::new("development".to_string(), packages, roots, graph, Duration::from_millis(12))
    }

    #[test]
    fn test_accessors() {
        let resolution = sample();
        assert_eq!(resolution.len(), 3);
        assert_eq!(resolution.version_of("lib"), Some(&Version::new(1, 4, 0)));
        assert!(resolution.get("flask").is_none());
        assert_eq!(resolution.for_language("javascript").count(), 2);
        assert_eq!(
            resolution.roots().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["app", "requests", "requests"]
        );
        assert_eq!(resolution.dependents_of("lib")[0].name, "app");
    }

    #[test]
    fn test_version_map_and_install_plan() {
        let resolution = sample();

        let map = resolution.to_version_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["lib"], "1.4.0");
        assert_eq!(map["requests"], "1.2.0");

        let plan = resolution.install_plan();
        assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["javascript", "python", "rust"]);
        assert_eq!(plan["javascript"], vec![PinnedPackage::new("app", "1.0.0")]);
        assert_eq!(plan["rust"], vec![PinnedPackage::new("requests", "1.2.0")]);
    }

    #[test]
    fn test_summary_serializes() {
        let resolution = sample();
        let json = serde_json::to_value(resolution.summary()).unwrap();
        assert_eq!(json["environment"], "development");
        assert_eq!(json["package_count"], 3);
        assert_eq!(json["requirement_count"], 1);
        assert_eq!(json["packages"][1]["required_by"], "app@1.0.0");
        assert_eq!(json["packages"][1]["version"], "1.4.0");
    }
}
