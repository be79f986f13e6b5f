//! `paxly resolve` command implementation.
//!
//! Resolves one environment and prints every package of the closure with the
//! version chosen for it, as text or JSON.

use paxly_core::error::{PaxlyError, PaxlyResult};
use paxly_resolver::{Resolution, ResolvedPackage};

use super::CommandContext;

/// Execute the `paxly resolve` command
pub async fn execute(env: Option<String>, json: bool, ctx: &CommandContext) -> PaxlyResult<()> {
    let environment = ctx.environment(env);
    let (manifest, _path) = ctx.load_manifest().await?;

    if !json {
        ctx.output.step("🔍", &format!("Resolving '{}'", environment));
    }

    let resolution = ctx.resolve(&manifest, &environment).await?;

    if json {
        ctx.output.print(&render_json(&resolution)?);
        return Ok(());
    }

    for package in resolution.iter() {
        ctx.output.print(&format_package(package));
    }
    ctx.output.success(&format!(
        "Resolved {} packages in {:.2}s",
        resolution.len(),
        resolution.elapsed().as_secs_f64()
    ));

    Ok(())
}

/// One line per resolved package
pub fn format_package(package: &ResolvedPackage) -> String {
    format!(
        "{:<10} {} {} ({} from {})",
        package.language, package.name, package.published, package.constraint, package.required_by
    )
}

pub fn render_json(resolution: &Resolution) -> PaxlyResult<String> {
    serde_json::to_string_pretty(&resolution.summary())
        .map_err(|e| PaxlyError::io("Failed to serialize resolution", e.into()))
}
