//! In-place edits used by `paxly add`, `remove` and `update`

use super::{EnvironmentSection, Manifest};
use crate::ConfigResult;
use paxly_core::error::PaxlyError;
use paxly_core::types::{Constraint, Dependency};

impl Manifest {
    /// Mutable access to an environment, failing if it is not declared
    pub fn environment_mut(&mut self, name: &str) -> ConfigResult<&mut EnvironmentSection> {
        self.environments
            .get_mut(name)
            .ok_or_else(|| PaxlyError::EnvironmentNotFound { name: name.to_string() })
    }

    /// Declare a new dependency in `environment`
    pub fn add_dependency(
        &mut self,
        environment: &str,
        language: &str,
        name: &str,
        constraint: &str,
    ) -> ConfigResult<()> {
        Constraint::parse(constraint)?;

        let env = self.environment_mut(environment)?;
        let deps = env.dependencies.entry(language.to_string()).or_default();

        if deps.iter().any(|dep| dep.name == name) {
            return Err(PaxlyError::DuplicateDependency {
                environment: environment.to_string(),
                language: language.to_string(),
                name: name.to_string(),
            });
        }

        deps.push(Dependency::new(name, constraint));
        Ok(())
    }

    /// Remove a declared dependency, dropping the language key once empty
    pub fn remove_dependency(&mut self, environment: &str, language: &str, name: &str) -> ConfigResult<Dependency> {
        let not_found = || PaxlyError::DependencyNotFound {
            environment: environment.to_string(),
            language: language.to_string(),
            name: name.to_string(),
        };

        let env = self.environment_mut(environment)?;
        let deps = env.dependencies.get_mut(language).ok_or_else(not_found)?;
        let index = deps.iter().position(|dep| dep.name == name).ok_or_else(not_found)?;
        let removed = deps.remove(index);

        if deps.is_empty() {
            env.dependencies.shift_remove(language);
        }

        Ok(removed)
    }

    /// Replace the constraint of a declared dependency, returning the old one
    pub fn update_dependency(
        &mut self,
        environment: &str,
        language: &str,
        name: &str,
        constraint: &str,
    ) -> ConfigResult<String> {
        Constraint::parse(constraint)?;

        let env = self.environment_mut(environment)?;
        let dep = env
            .dependencies
            .get_mut(language)
            .and_then(|deps| deps.iter_mut().find(|dep| dep.name == name))
            .ok_or_else(|| PaxlyError::DependencyNotFound {
                environment: environment.to_string(),
                language: language.to_string(),
                name: name.to_string(),
            })?;

        Ok(std::mem::replace(&mut dep.constraint, constraint.to_string()))
    }
}
