//! Requirement graph of a resolution using petgraph

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// Who requires whom, with the constraint on each edge
#[derive(Debug, Clone, Default)]
pub struct ResolutionGraph {
    /// Nodes are package names, edges point from dependent to dependency
    graph: DiGraph<String, String>,
    /// Map from package name to NodeIndex for fast lookups
    node_map: HashMap<String, NodeIndex>,
}

impl ResolutionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package node, returning the existing one if present
    pub fn add_package(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.node_map.get(name) {
            return *index;
        }

        let index = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), index);
        index
    }

    /// Record that `from` requires `to` under `constraint`
    pub fn add_requirement(&mut self, from: &str, to: &str, constraint: &str) {
        let from = self.add_package(from);
        let to = self.add_package(to);
        self.graph.add_edge(from, to, constraint.to_string());
    }

    /// Packages that require `name`, in the order they were added
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut indices: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .collect();
        indices.sort();
        indices.dedup();
        indices.into_iter().map(|i| self.graph[i].as_str()).collect()
    }

    pub fn requirement_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_package_is_idempotent() {
        let mut graph = ResolutionGraph::new();
        let a = graph.add_package("a");
        assert_eq!(graph.add_package("a"), a);
        assert_eq!(graph.requirement_count(), 0);
    }

    #[test]
    fn test_dependents_in_insertion_order() {
        let mut graph = ResolutionGraph::new();
        graph.add_requirement("a", "c", "^2.0");
        graph.add_requirement("b", "c", "^2.1");
        graph.add_requirement("a", "b", "^1.0");
        graph.add_requirement("a", "c", "^2.0");

        assert_eq!(graph.dependents("c"), vec!["a", "b"]);
        assert_eq!(graph.dependents("b"), vec!["a"]);
        assert_eq!(graph.requirement_count(), 4);
        assert!(graph.dependents("zzz").is_empty());
    }
}
