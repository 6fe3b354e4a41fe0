//! Single-album export command.

use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use super::Context;
use crate::export::{self, execute::Executor, shell};
use crate::library;

/// Print or execute the export plan of one album directory
pub fn cmd_plan(
    ctx: &Context,
    path: &Path,
    output_dir: Option<&PathBuf>,
    audio_only: bool,
    doit: bool,
    jobs: Option<usize>,
) -> anyhow::Result<()> {
    let output_root = ctx.output_root(output_dir);
    let audio_only = audio_only || ctx.config.output.audio_only;

    let mut hints = ctx.hint_store(false);
    let album = library::load_album(
        path,
        &ctx.prober(),
        hints.as_mut(),
        &ctx.resolve_options(),
        &AtomicBool::new(false),
    )
    .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let ops = export::plan(&album, &output_root, audio_only);

    if !doit {
        for line in shell::render_all(&ops, &ctx.config.tools.ffmpeg) {
            println!("{line}");
        }
        return Ok(());
    }

    let jobs = jobs.unwrap_or(ctx.config.export.jobs);
    let summary = Executor::new(&ctx.config.tools.ffmpeg, jobs)
        .run(&ops)
        .with_context(|| format!("Failed to export {}", path.display()))?;

    println!(
        "Exported {} - {} to {:?}: {} files copied, {} tracks cut",
        album.artist,
        album.name,
        export::album_dir(&album, &output_root),
        summary.copies,
        summary.clips
    );
    Ok(())
}
