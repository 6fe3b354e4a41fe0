//! Configuration command.

use super::Context;
use crate::config;

/// Print the effective configuration, optionally saving it
pub fn cmd_config(ctx: &Context, write: bool) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(&ctx.config)?);

    if write {
        config::save(&ctx.config)?;
        if let Some(path) = config::config_path() {
            println!("# saved to {}", path.display());
        }
    }
    Ok(())
}
