//! `paxly install` command implementation.
//!
//! Resolves the environment first. Only when resolution succeeds does each
//! language plugin receive its declared packages, pinned to the resolved
//! versions, so a failed resolution installs nothing.

use paxly_core::error::{PaxlyError, PaxlyResult};
use tracing::debug;

use super::CommandContext;
use crate::output::progress::Progress;

/// Execute the `paxly install` command
pub async fn execute(env: Option<String>, ctx: &CommandContext) -> PaxlyResult<()> {
    let environment = ctx.environment(env);
    let (manifest, _path) = ctx.load_manifest().await?;

    ctx.output.step("🔍", &format!("Resolving '{}'", environment));
    let resolution = ctx.resolve(&manifest, &environment).await?;
    ctx.output.info(&format!(
        "Resolved {} packages in {}ms",
        resolution.len(),
        resolution.elapsed().as_millis()
    ));

    let plan = resolution.install_plan();
    if plan.is_empty() {
        ctx.output.info("No dependencies to install");
        return Ok(());
    }

    let mut progress = Progress::new(plan.len(), "Installing");
    for (language, packages) in &plan {
        let plugin = ctx.registry.get(language).ok_or_else(|| PaxlyError::UnknownLanguage {
            language: language.clone(),
        })?;

        progress.advance(&format!("{} ({} packages)", language, packages.len()));
        debug!("Installing {:?} with the {} plugin", packages, language);

        plugin
            .install(packages)
            .await
            .map_err(|e| PaxlyError::plugin(language.as_str(), "install failed", e))?;
    }

    ctx.output.success(&format!(
        "Installed {} dependencies in {:.2}s",
        plan.values().map(Vec::len).sum::<usize>(),
        progress.elapsed_secs()
    ));

    Ok(())
}
