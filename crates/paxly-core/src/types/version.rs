//! Semantic version and caret constraint types.
//!
//! `Version` follows semantic versioning precedence (build metadata is ignored,
//! pre-releases sort below their release). `Constraint` supports a single
//! caret range, `^MAJOR.MINOR[.PATCH]`, meaning `>=MAJOR.MINOR.PATCH, <(MAJOR+1).0.0`.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// Caret version constraint (`^1.2` allows `>=1.2.0, <2.0.0`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    raw: String,
    lower: Version,
    upper: Version,
}

/// Version and constraint parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid version constraint '{input}': {reason}")]
    InvalidConstraint { input: String, reason: String },
}

impl VersionError {
    fn version(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    fn constraint(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl Version {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        input.parse()
    }

    /// Check if this version satisfies a constraint
    pub fn satisfies(&self, constraint: &Constraint) -> bool {
        constraint.satisfies(self)
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Precedence comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }
}

/// Compare dot-separated pre-release identifiers: numeric identifiers compare
/// numerically and sort below alphanumeric ones, a shorter list sorts first.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (is_numeric(x), is_numeric(y)) {
                    // No leading zeros, so length orders first
                    (true, true) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(input: &str, component: &str, label: &str) -> Result<u64, VersionError> {
    if !is_numeric(component) {
        return Err(VersionError::version(
            input,
            format!("{} component '{}' is not a number", label, component),
        ));
    }
    component
        .parse()
        .map_err(|_| VersionError::version(input, format!("{} component '{}' is too large", label, component)))
}

fn validate_identifiers(input: &str, part: &str, label: &str, numeric_no_leading_zero: bool) -> Result<(), VersionError> {
    for identifier in part.split('.') {
        if identifier.is_empty() {
            return Err(VersionError::version(input, format!("empty {} identifier", label)));
        }
        if !identifier.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(VersionError::version(
                input,
                format!("{} identifier '{}' contains invalid characters", label, identifier),
            ));
        }
        if numeric_no_leading_zero && is_numeric(identifier) && identifier.len() > 1 && identifier.starts_with('0') {
            return Err(VersionError::version(
                input,
                format!("numeric {} identifier '{}' has a leading zero", label, identifier),
            ));
        }
    }
    Ok(())
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        // Go module versions carry a `v` prefix
        let unprefixed = input.strip_prefix('v').unwrap_or(input);

        if unprefixed.is_empty() {
            return Err(VersionError::version(input, "empty version"));
        }

        let (version_part, build) = match unprefixed.split_once('+') {
            Some((v, b)) => {
                validate_identifiers(input, b, "build", false)?;
                (v, Some(b.to_string()))
            }
            None => (unprefixed, None),
        };

        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => {
                validate_identifiers(input, p, "pre-release", true)?;
                (c, Some(p.to_string()))
            }
            None => (version_part, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::version(input, "expected MAJOR.MINOR.PATCH"));
        }

        Ok(Version {
            major: parse_number(input, parts[0], "major")?,
            minor: parse_number(input, parts[1], "minor")?,
            patch: parse_number(input, parts[2], "patch")?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with precedence equality: build metadata is excluded
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Constraint {
    /// Parse a caret constraint (`^MAJOR.MINOR[.PATCH]`)
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();

        let body = raw.strip_prefix('^').ok_or_else(|| {
            VersionError::constraint(raw, "only caret ranges of the form ^MAJOR.MINOR[.PATCH] are supported")
        })?;

        let parts: Vec<&str> = body.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(VersionError::constraint(raw, "expected ^MAJOR.MINOR or ^MAJOR.MINOR.PATCH"));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if !is_numeric(part) {
                return Err(VersionError::constraint(raw, format!("'{}' is not a number", part)));
            }
            *slot = part
                .parse()
                .map_err(|_| VersionError::constraint(raw, format!("'{}' is too large", part)))?;
        }

        let [major, minor, patch] = numbers;
        let next_major = major
            .checked_add(1)
            .ok_or_else(|| VersionError::constraint(raw, "major version has no upper bound"))?;

        Ok(Self {
            raw: raw.to_string(),
            lower: Version::new(major, minor, patch),
            upper: Version::new(next_major, 0, 0),
        })
    }

    /// Check if a version lies inside the range. Pre-releases never match.
    pub fn satisfies(&self, version: &Version) -> bool {
        !version.is_prerelease() && version >= &self.lower && version < &self.upper
    }

    /// Inclusive lower bound
    pub fn lower(&self) -> &Version {
        &self.lower
    }

    /// Exclusive upper bound
    pub fn upper(&self) -> &Version {
        &self.upper
    }

    /// Constraint exactly as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Explicit range form, e.g. `>=1.2.0, <2.0.0`
    pub fn range(&self) -> String {
        format!(">={}, <{}", self.lower, self.upper)
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    #[test]
    fn test_version_parsing() {
        let v = v("1.2.3");
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
        assert_eq!(v.prerelease, None);
        assert_eq!(v.build, None);
    }

    #[test]
    fn test_version_with_prerelease_and_build() {
        let v = v("1.2.3-alpha.1+build.7");
        assert_eq!(v.prerelease.as_deref(), Some("alpha.1"));
        assert_eq!(v.build.as_deref(), Some("build.7"));
        assert_eq!(v.to_string(), "1.2.3-alpha.1+build.7");
    }

    #[test]
    fn test_version_v_prefix() {
        assert_eq!(v("v1.9.1"), Version::new(1, 9, 1));
    }

    #[test]
    fn test_invalid_versions() {
        for input in ["", "1.2", "1.2.3.4", "a.b.c", "1.2.x", "+1.2.3", "1.-2.3", "1.2.3-", "1.2.3-01", "1.2.3+", "1.2.3-al_pha"] {
            assert!(
                matches!(Version::from_str(input), Err(VersionError::InvalidVersion { .. })),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_version_comparison() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("1.0.0") < v("1.1.0"));
        assert!(v("1.1.0") < v("1.1.1"));
        assert!(v("1.10.0") > v("1.9.0"));
    }

    #[test]
    fn test_prerelease_ordering() {
        // Ordering example from semver.org
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_build_metadata_ignored_for_precedence() {
        assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
        assert_eq!(v("v1.0.0"), v("1.0.0"));
    }

    #[test]
    fn test_version_serde_as_string() {
        let json = serde_json::to_string(&v("1.2.3-rc.1")).unwrap();
        assert_eq!(json, "\"1.2.3-rc.1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.2.3-rc.1"));
        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }

    #[test]
    fn test_caret_bounds() {
        let c = Constraint::parse("^1.2").unwrap();
        assert_eq!(c.lower(), &Version::new(1, 2, 0));
        assert_eq!(c.upper(), &Version::new(2, 0, 0));
        assert_eq!(c.range(), ">=1.2.0, <2.0.0");

        let c = Constraint::parse("^4.17.1").unwrap();
        assert_eq!(c.lower(), &Version::new(4, 17, 1));
        assert_eq!(c.to_string(), "^4.17.1");
    }

    #[test]
    fn test_caret_satisfies() {
        let c = Constraint::parse("^1.2").unwrap();
        assert!(c.satisfies(&v("1.2.0")));
        assert!(c.satisfies(&v("1.2.1")));
        assert!(c.satisfies(&v("1.9.9")));
        assert!(!c.satisfies(&v("1.1.9")));
        assert!(!c.satisfies(&v("2.0.0")));
        assert!(!c.satisfies(&v("1.5.0-beta.1")));
        assert!(!c.satisfies(&v("2.0.0-alpha")));
    }

    #[test]
    fn test_caret_zero_major_uses_next_major() {
        let c = Constraint::parse("^0.3").unwrap();
        assert!(c.satisfies(&v("0.9.0")));
        assert!(!c.satisfies(&v("1.0.0")));
    }

    #[test]
    fn test_invalid_constraints() {
        for input in ["", "1.2", "~1.2", ">=1.0.0", "^1", "^1.2.3.4", "^a.b", "^1.2,<3", "^1.2.3-beta", "*"] {
            assert!(
                matches!(Constraint::parse(input), Err(VersionError::InvalidConstraint { .. })),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_constraint_trims_whitespace() {
        let c = Constraint::parse("  ^2.28 ").unwrap();
        assert_eq!(c.as_str(), "^2.28");
    }
}
