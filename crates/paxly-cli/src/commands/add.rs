//! `paxly add` command implementation.
//!
//! Declares a new dependency in one environment of the manifest.

use paxly_core::error::{PaxlyError, PaxlyResult};

use super::CommandContext;

/// Execute the `paxly add` command
pub async fn execute(
    language: &str,
    name: &str,
    constraint: &str,
    env: Option<String>,
    ctx: &CommandContext,
) -> PaxlyResult<()> {
    if !ctx.registry.contains(language) {
        return Err(PaxlyError::UnknownLanguage {
            language: language.to_string(),
        });
    }

    let environment = ctx.environment(env);
    let (mut manifest, path) = ctx.load_manifest().await?;

    ctx.output
        .step("➕", &format!("Adding {} {} {} to '{}'", language, name, constraint, environment));

    manifest.add_dependency(&environment, language, name, constraint)?;
    manifest.save(&path).await?;

    ctx.output.success(&format!("Added {} {}", name, constraint));
    Ok(())
}
