//! `paxly init` command implementation.
//!
//! Writes a fresh paxly.yaml with the default environments and trusted sources.
//! An existing manifest is never overwritten.

use paxly_config::manifest;
use paxly_config::Manifest;
use paxly_core::error::PaxlyResult;

use super::CommandContext;

/// Arguments of `paxly init`
#[derive(Debug, Clone)]
pub struct InitArgs {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
}

/// Execute the `paxly init` command
pub async fn execute(args: InitArgs, ctx: &CommandContext) -> PaxlyResult<()> {
    let path = ctx.cwd.join(&ctx.settings.manifest_file);

    ctx.output.step("📝", &format!("Initializing {} in {}", args.name, ctx.cwd));

    let manifest = Manifest::init(&args.name, &args.version, args.description, &args.authors)?;
    manifest::create_file(&manifest, &path).await?;

    ctx.output.success(&format!("Created {}", path));
    ctx.output.info("");
    ctx.output.info("Next steps:");
    ctx.output.info("  paxly add --language python --name requests --version ^2.28");
    ctx.output.info("  paxly install");

    Ok(())
}
