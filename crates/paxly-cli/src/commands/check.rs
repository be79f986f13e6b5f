//! `paxly check` command implementation.
//!
//! Loading the manifest validates it. Languages without a plugin are reported
//! as warnings since resolving them would fail, and each remaining plugin is
//! asked to confirm its native tooling is usable.

use indexmap::IndexSet;
use paxly_core::error::PaxlyResult;
use tracing::debug;

use super::CommandContext;

/// Execute the `paxly check` command
pub async fn execute(ctx: &CommandContext) -> PaxlyResult<()> {
    ctx.output.step("🔍", "Checking manifest");

    let (manifest, path) = ctx.load_manifest().await?;

    let unknown = unknown_languages(&manifest, ctx);
    for (environment, language) in &unknown {
        ctx.output.warn(&format!(
            "Environment '{}' uses '{}', which has no plugin",
            environment, language
        ));
    }

    let languages: IndexSet<&str> = manifest
        .environments
        .values()
        .flat_map(|env| env.languages())
        .collect();
    for language in languages {
        let Some(plugin) = ctx.registry.get(language) else {
            continue;
        };
        match plugin.initialize().await {
            Ok(()) => debug!("Tooling for '{}' is available", language),
            Err(e) => ctx
                .output
                .warn(&format!("Tooling for '{}' is not usable: {}", language, e)),
        }
    }

    let declarations: usize = manifest.environments.values().map(|env| env.len()).sum();
    ctx.output.success(&format!(
        "{} is valid ({} environments, {} dependencies)",
        path,
        manifest.environments.len(),
        declarations
    ));

    Ok(())
}

/// `(environment, language)` pairs no registered plugin handles
pub fn unknown_languages(manifest: &paxly_config::Manifest, ctx: &CommandContext) -> Vec<(String, String)> {
    manifest
        .environments
        .iter()
        .flat_map(|(name, env)| env.languages().map(move |language| (name, language)))
        .filter(|(_, language)| !ctx.registry.contains(language))
        .map(|(name, language)| (name.clone(), language.to_string()))
        .collect()
}
