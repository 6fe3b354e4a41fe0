//! Batch commands over a directory of albums.

use anyhow::Context as _;
use std::path::{Path, PathBuf};

use super::{Context, watch_interrupt};
use crate::export::{self, shell};
use crate::library::{self, ScanEvent};

/// Print export plans for every album below `root`
pub fn cmd_scan(
    ctx: &Context,
    root: &Path,
    output_dir: Option<&PathBuf>,
    audio_only: bool,
) -> anyhow::Result<()> {
    let output_root = ctx.output_root(output_dir);
    let audio_only = audio_only || ctx.config.output.audio_only;
    let interrupt = watch_interrupt()?;
    let mut hints = ctx.hint_store(true);

    let summary = library::scan_albums(
        root,
        &ctx.prober(),
        hints.as_mut(),
        &ctx.resolve_options(),
        &interrupt,
        |event| match event {
            ScanEvent::Resolved { dir, album } => {
                println!("# {}", dir.display());
                let ops = export::plan(&album, &output_root, audio_only);
                for line in shell::render_all(&ops, &ctx.config.tools.ffmpeg) {
                    println!("{line}");
                }
                println!();
            }
            ScanEvent::Failed { dir, error } => {
                eprintln!("FAILED {}: {}", dir.display(), error);
            }
        },
    )
    .with_context(|| format!("Scan of {} stopped", root.display()))?;

    eprintln!(
        "\nScan complete: {} albums, {} resolved, {} failed",
        summary.total(),
        summary.resolved,
        summary.failed.len()
    );
    for dir in &summary.failed {
        eprintln!("  {}", dir.display());
    }
    Ok(())
}

/// Write a JSON index of every album below `root`
pub fn cmd_index(
    ctx: &Context,
    root: &Path,
    by_artist: bool,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let interrupt = watch_interrupt()?;
    let mut hints = ctx.hint_store(true);

    let (index, summary) = library::index(
        root,
        &ctx.prober(),
        hints.as_mut(),
        &ctx.resolve_options(),
        &interrupt,
    )
    .with_context(|| format!("Indexing {} stopped", root.display()))?;

    let json = index.to_json(by_artist)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write index to {:?}", path))?;
            tracing::info!("Wrote index of {} albums to {:?}", index.albums.len(), path);
        }
        None => println!("{json}"),
    }

    if !summary.failed.is_empty() {
        eprintln!("{} albums could not be resolved", summary.failed.len());
    }
    Ok(())
}
