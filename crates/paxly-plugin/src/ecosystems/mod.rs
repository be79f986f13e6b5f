//! Built-in ecosystem adapters

mod go;
mod javascript;
mod python;
mod rust;

pub use go::GoPlugin;
pub use javascript::JavaScriptPlugin;
pub use python::PythonPlugin;
pub use rust::RustPlugin;

use paxly_core::types::{Constraint, Dependency};
use tracing::debug;

/// Keep a native requirement only if it reads as a caret constraint.
///
/// `bare_is_caret` treats a requirement without operator (`1.0`) as `^1.0`, which is
/// what Cargo means by it. Everything else is left to the native tool.
pub(crate) fn caret_edge(dependent: &str, name: &str, requirement: &str, bare_is_caret: bool) -> Option<Dependency> {
    let requirement = requirement.trim();
    let candidate = if bare_is_caret && requirement.starts_with(|c: char| c.is_ascii_digit()) {
        format!("^{}", requirement)
    } else {
        requirement.to_string()
    };

    match Constraint::parse(&candidate) {
        Ok(_) => Some(Dependency::new(name, candidate)),
        Err(_) => {
            debug!(
                "Dropping edge {} -> {} '{}': not a caret range, left to the native tool",
                dependent, name, requirement
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_edge() {
        assert_eq!(caret_edge("a", "b", "^1.2.3", false), Some(Dependency::new("b", "^1.2.3")));
        assert_eq!(caret_edge("a", "b", "1.2", true), Some(Dependency::new("b", "^1.2")));
        assert_eq!(caret_edge("a", "b", "1.2", false), None);
        assert_eq!(caret_edge("a", "b", "~1.2", true), None);
        assert_eq!(caret_edge("a", "b", ">=1, <2", true), None);
        assert_eq!(caret_edge("a", "b", "*", true), None);
    }
}
