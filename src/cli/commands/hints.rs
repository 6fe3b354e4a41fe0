//! Hint cache inspection.

use std::path::Path;

use super::Context;
use crate::hints;

/// Show the cached hints of a directory, or erase one
pub fn cmd_hints(ctx: &Context, path: &Path, erase: Option<&str>) -> anyhow::Result<()> {
    if let Some(key) = erase {
        let mut store = ctx.hint_store(true);
        if store.erase(path, key)? {
            println!("Erased hint '{key}'");
        } else {
            println!("No hint '{key}' cached for {}", path.display());
        }
        return Ok(());
    }

    let cached = hints::load(path)?;
    if cached.is_empty() {
        println!("No hints cached for {}", path.display());
    }
    for (key, value) in &cached {
        println!("{key} = {value}");
    }
    Ok(())
}
