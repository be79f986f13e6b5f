//! Common utilities for benchmarks

use criterion::Criterion;
use paxly_config::{EnvironmentSection, Manifest};
use paxly_core::types::Dependency;
use paxly_plugin::testing::FakePlugin;
use paxly_plugin::PluginRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Language every synthetic package is registered under
pub const BENCH_LANGUAGE: &str = "javascript";

/// Versions published for every synthetic package
pub const PUBLISHED: [&str; 6] = ["0.9.0", "1.0.0", "1.1.0", "1.2.3", "1.10.0", "2.0.0"];

pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(5))
        .sample_size(50)
}

/// A registry plus a manifest whose `development` environment exercises it
pub struct Scenario {
    pub registry: PluginRegistry,
    pub manifest: Manifest,
    pub package_count: usize,
}

/// `width` root packages, each with `fanout` leaves shared across all roots
pub fn wide_scenario(width: usize, fanout: usize) -> Scenario {
    let mut plugin = FakePlugin::new(BENCH_LANGUAGE);
    let leaves: Vec<String> = (0..fanout).map(|i| format!("leaf-{}", i)).collect();
    let leaf_edges: Vec<(&str, &str)> = leaves.iter().map(|name| (name.as_str(), "^1.0")).collect();

    for leaf in &leaves {
        plugin = plugin.with_package(leaf, &PUBLISHED);
    }

    let mut roots = Vec::with_capacity(width);
    for i in 0..width {
        let name = format!("root-{}", i);
        plugin = plugin
            .with_package(&name, &PUBLISHED)
            .with_dependencies(&name, "1.10.0", &leaf_edges);
        roots.push(name);
    }

    scenario(plugin, &roots, width + fanout)
}

/// A single chain `link-0 -> link-1 -> ... -> link-{depth-1}`
pub fn deep_scenario(depth: usize) -> Scenario {
    let mut plugin = FakePlugin::new(BENCH_LANGUAGE);

    for i in 0..depth {
        let name = format!("link-{}", i);
        plugin = plugin.with_package(&name, &PUBLISHED);
        if i + 1 < depth {
            let next = format!("link-{}", i + 1);
            plugin = plugin.with_dependencies(&name, "1.10.0", &[(next.as_str(), "^1.0")]);
        }
    }

    scenario(plugin, &["link-0".to_string()], depth)
}

fn scenario(plugin: FakePlugin, roots: &[String], package_count: usize) -> Scenario {
    let mut registry = PluginRegistry::new();
    // A fresh registry with one plugin cannot collide
    let _ = registry.register(Arc::new(plugin));

    Scenario {
        registry,
        manifest: manifest_with(roots),
        package_count,
    }
}

/// Manifest declaring `roots` under the bench language in `development`
pub fn manifest_with(roots: &[String]) -> Manifest {
    let mut section = EnvironmentSection::default();
    section.dependencies.insert(
        BENCH_LANGUAGE.to_string(),
        roots.iter().map(|name| Dependency::new(name.as_str(), "^1.0")).collect(),
    );

    let mut manifest = match Manifest::init("bench", "1.0.0", None, &[]) {
        Ok(manifest) => manifest,
        Err(e) => panic!("bench manifest: {}", e),
    };
    manifest.environments.insert("development".to_string(), section);
    manifest
}

/// paxly.yaml content with `count` python dependencies in `development`
pub fn manifest_yaml(count: usize) -> String {
    let mut yaml = String::from(
        "project:\n  name: bench\n  version: 1.0.0\nenvironments:\n  development:\n    dependencies:\n      python:\n",
    );
    for i in 0..count {
        yaml.push_str(&format!("        - name: package-{}\n          version: ^{}.{}\n", i, i % 5, i % 10));
    }
    yaml
}

/// `count` version strings of mixed shapes
pub fn version_strings(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("{}.{}.{}", i % 7, i % 13, i % 31),
            1 => format!("v{}.{}.{}", i % 5, i % 11, i % 17),
            2 => format!("{}.{}.{}-beta.{}", i % 3, i % 9, i % 5, i % 4),
            _ => format!("{}.{}.{}+build.{}", i % 6, i % 8, i % 10, i),
        })
        .collect()
}
