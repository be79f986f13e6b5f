//! `paxly list` command implementation.

use paxly_core::error::{PaxlyError, PaxlyResult};
use tracing::warn;

use super::CommandContext;

/// Execute the `paxly list` command
pub async fn execute(env: Option<String>, ctx: &CommandContext) -> PaxlyResult<()> {
    let environment = ctx.environment(env);
    let (manifest, _path) = ctx.load_manifest().await?;

    let section = manifest
        .environment(&environment)
        .ok_or_else(|| PaxlyError::EnvironmentNotFound {
            name: environment.clone(),
        })?;

    if section.is_empty() {
        ctx.output.info(&format!("No dependencies declared in '{}'", environment));
        return Ok(());
    }

    ctx.output.step("📋", &format!("Dependencies of '{}'", environment));

    for (language, dependencies) in &section.dependencies {
        ctx.output.print(&format!("{}:", language));
        for dependency in dependencies {
            ctx.output.print(&format!("  {} {}", dependency.name, dependency.constraint));
        }

        let Some(plugin) = ctx.registry.get(language) else {
            ctx.output.warn(&format!("No plugin registered for '{}'", language));
            continue;
        };

        match plugin.list_installed().await {
            Ok(installed) => {
                let declared: Vec<_> = installed
                    .iter()
                    .filter(|package| dependencies.iter().any(|dep| dep.name == package.name))
                    .map(|package| package.to_string())
                    .collect();

                if declared.is_empty() {
                    ctx.output.info("  (none installed)");
                } else {
                    ctx.output.info(&format!("  installed: {}", declared.join(", ")));
                }
            }
            Err(e) => {
                warn!("Listing installed {} packages failed: {}", language, e);
                ctx.output.warn(&format!("Could not list installed {} packages: {}", language, e));
            }
        }
    }

    Ok(())
}
