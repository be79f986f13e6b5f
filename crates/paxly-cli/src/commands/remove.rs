//! `paxly remove` command implementation.

use paxly_core::error::PaxlyResult;

use super::CommandContext;

/// Execute the `paxly remove` command
pub async fn execute(language: &str, name: &str, env: Option<String>, ctx: &CommandContext) -> PaxlyResult<()> {
    let environment = ctx.environment(env);
    let (mut manifest, path) = ctx.load_manifest().await?;

    ctx.output
        .step("➖", &format!("Removing {} {} from '{}'", language, name, environment));

    let removed = manifest.remove_dependency(&environment, language, name)?;
    manifest.save(&path).await?;

    ctx.output.success(&format!("Removed {}", removed));
    Ok(())
}
