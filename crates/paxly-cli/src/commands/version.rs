//! `paxly version` command implementation.

use paxly_core::error::PaxlyResult;
use paxly_plugin::PLUGIN_API_VERSION;

use super::CommandContext;

/// Execute the `paxly version` command
pub async fn execute(ctx: &CommandContext) -> PaxlyResult<()> {
    ctx.output.print(&format!("Paxly v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.print(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.print(&format!("Target: {}", env!("PAXLY_TARGET")));
    ctx.output.print(&format!("Rust: {}", env!("RUSTC_VERSION")));
    ctx.output.print(&format!("Plugin API: {}", PLUGIN_API_VERSION));
    ctx.output.print(&format!(
        "Languages: {}",
        ctx.registry.languages().collect::<Vec<_>>().join(", ")
    ));

    Ok(())
}
