//! File classification listing.

use anyhow::Context as _;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use super::Context;
use crate::classify::{self, FileCategory};
use crate::scanner;

/// List every entry of a directory with its category and magic string
pub fn cmd_classify(ctx: &Context, path: &Path) -> anyhow::Result<()> {
    let options = ctx.resolve_options().classify;
    let files = scanner::snapshot(path, &ctx.prober(), options, &AtomicBool::new(false))
        .with_context(|| format!("Failed to scan {}", path.display()))?;

    let mut unknown = 0;
    for file in &files {
        let category = classify::classify(file, options);
        if category == FileCategory::Unknown {
            unknown += 1;
        }
        let shown = file.path.strip_prefix(path).unwrap_or(&file.path);
        if file.signature.is_empty() {
            println!("{:<16} {}", category.to_string(), shown.display());
        } else {
            println!("{:<16} {}  ({})", category.to_string(), shown.display(), file.signature);
        }
    }

    if unknown > 0 {
        tracing::warn!("{} unknown files in {:?}", unknown, path);
    }
    Ok(())
}
