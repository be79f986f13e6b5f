//! Dependency resolution engine for Paxly
//!
//! Walks the declared dependencies of one environment depth-first, asking each
//! language plugin for published versions and direct dependencies. Every package
//! gets the latest version compatible with its caret constraint. Cycles, conflicting
//! requirements and unsatisfiable constraints abort the run with a diagnostic that
//! names the packages and constraints involved.

pub mod diagnostics;
pub mod engine;
pub mod graph;
pub mod report;
pub mod select;

// Re-export main types
pub use diagnostics::{ErrorKind, Lookup, Requirer, ResolveError};
pub use engine::{Resolver, ResolverOptions};
pub use graph::ResolutionGraph;
pub use report::{PackageKey, Resolution, ResolutionSummary, ResolvedPackage};
pub use select::{Candidate, VersionSelector};

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolveError>;
