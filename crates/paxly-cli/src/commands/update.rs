//! `paxly update` command implementation.
//!
//! Replaces the constraint of an already declared dependency.

use paxly_core::error::PaxlyResult;

use super::CommandContext;

/// Execute the `paxly update` command
pub async fn execute(
    language: &str,
    name: &str,
    constraint: &str,
    env: Option<String>,
    ctx: &CommandContext,
) -> PaxlyResult<()> {
    let environment = ctx.environment(env);
    let (mut manifest, path) = ctx.load_manifest().await?;

    let previous = manifest.update_dependency(&environment, language, name, constraint)?;
    manifest.save(&path).await?;

    ctx.output
        .success(&format!("Updated {} {}: {} -> {}", language, name, previous, constraint));
    Ok(())
}
