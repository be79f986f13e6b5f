//! Version selection among published versions

use paxly_core::types::{Constraint, Version};
use std::cmp::Ordering;

/// A published version string and its parsed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: Version,
    /// Exactly as the plugin reported it
    pub raw: String,
}

impl Candidate {
    /// Precedence order, falling back to the raw string so that distinct strings
    /// normalising to the same version (`v1.0.0`, `1.0.0+build`) still order totally
    fn precedence(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version).then_with(|| self.raw.cmp(&other.raw))
    }
}

/// Picks the latest compatible version from a plugin's listing
#[derive(Debug, Clone, Default)]
pub struct VersionSelector {
    candidates: Vec<Candidate>,
    skipped: Vec<String>,
}

impl VersionSelector {
    /// Parse published version strings, setting aside those that do not parse
    pub fn from_published<S: AsRef<str>>(published: &[S]) -> Self {
        let mut selector = Self::default();

        for raw in published {
            let raw = raw.as_ref();
            match Version::parse(raw) {
                Ok(version) => selector.candidates.push(Candidate {
                    version,
                    raw: raw.to_string(),
                }),
                Err(_) => selector.skipped.push(raw.to_string()),
            }
        }

        selector
    }

    /// Highest candidate satisfying `constraint`
    pub fn select_latest<'a>(&'a self, constraint: &'a Constraint) -> Option<&'a Candidate> {
        self.matching(constraint).max_by(|a, b| a.precedence(b))
    }

    /// Candidates satisfying `constraint`, in listing order
    pub fn matching<'a>(&'a self, constraint: &'a Constraint) -> impl Iterator<Item = &'a Candidate> + 'a {
        self.candidates
            .iter()
            .filter(move |candidate| constraint.satisfies(&candidate.version))
    }

    /// Strings that were not valid versions
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn constraint(raw: &str) -> Constraint {
        Constraint::parse(raw).unwrap()
    }

    #[test]
    fn test_latest_compatible_wins() {
        let selector = VersionSelector::from_published(&["1.2.0", "1.2.1", "2.0.0"]);
        assert_eq!(selector.select_latest(&constraint("^1.2")).unwrap().raw, "1.2.1");

        let selector = VersionSelector::from_published(&["1.2.0", "1.2.1", "1.3.0"]);
        assert_eq!(selector.select_latest(&constraint("^1.2")).unwrap().raw, "1.3.0");
    }

    #[test]
    fn test_listing_order_is_irrelevant() {
        let selector = VersionSelector::from_published(&["1.9.0", "1.10.0", "1.2.0"]);
        assert_eq!(selector.select_latest(&constraint("^1.0")).unwrap().raw, "1.10.0");
    }

    #[test]
    fn test_unparsable_versions_are_skipped() {
        let selector = VersionSelector::from_published(&["1.0.0", "latest", "2.0rc1", "1.1.0"]);
        assert_eq!(selector.len(), 2);
        assert_eq!(selector.skipped(), &["latest".to_string(), "2.0rc1".to_string()]);
        assert_eq!(selector.select_latest(&constraint("^1.0")).unwrap().raw, "1.1.0");
    }

    #[test]
    fn test_prereleases_never_selected() {
        let selector = VersionSelector::from_published(&["1.0.0", "1.1.0-beta.1"]);
        assert_eq!(selector.len(), 2);
        assert_eq!(selector.select_latest(&constraint("^1.0")).unwrap().raw, "1.0.0");
    }

    #[test]
    fn test_equal_versions_tie_break_on_raw_string() {
        let selector = VersionSelector::from_published(&["v1.0.0", "1.0.0", "1.0.0+build.5"]);
        assert_eq!(selector.select_latest(&constraint("^1.0")).unwrap().raw, "v1.0.0");

        let reversed = VersionSelector::from_published(&["1.0.0+build.5", "1.0.0", "v1.0.0"]);
        assert_eq!(reversed.select_latest(&constraint("^1.0")).unwrap().raw, "v1.0.0");
    }

    #[test]
    fn test_nothing_matches() {
        let selector = VersionSelector::from_published(&["1.0.0", "2.0.0"]);
        assert!(selector.select_latest(&constraint("^5.0")).is_none());
        assert!(VersionSelector::from_published::<&str>(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_selection_is_max_satisfying_and_order_independent(
            mut versions in prop::collection::vec((0u64..4, 0u64..6, 0u64..6), 1..20),
            major in 0u64..4,
            minor in 0u64..6,
        ) {
            let constraint = constraint(&format!("^{}.{}", major, minor));
            let published: Vec<String> = versions.iter().map(|(a, b, c)| format!("{}.{}.{}", a, b, c)).collect();

            let forward = VersionSelector::from_published(&published)
                .select_latest(&constraint)
                .map(|c| c.version.clone());

            let expected = versions
                .iter()
                .map(|(a, b, c)| Version::new(*a, *b, *c))
                .filter(|v| constraint.satisfies(v))
                .max();
            prop_assert_eq!(forward.clone(), expected);

            versions.reverse();
            let reversed: Vec<String> = versions.iter().map(|(a, b, c)| format!("{}.{}.{}", a, b, c)).collect();
            let backward = VersionSelector::from_published(&reversed)
                .select_latest(&constraint)
                .map(|c| c.version.clone());
            prop_assert_eq!(forward, backward);
        }
    }
}
