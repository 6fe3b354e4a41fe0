//! Playlist and cue regeneration command.

use anyhow::Context as _;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use super::{Context, PlaylistFormat};
use crate::export::playlist;
use crate::library;

/// Print one playlist (or cue sheet) per disc, separated by blank lines
pub fn cmd_playlist(ctx: &Context, path: &Path, format: PlaylistFormat) -> anyhow::Result<()> {
    let mut hints = ctx.hint_store(false);
    let album = library::load_album(
        path,
        &ctx.prober(),
        hints.as_mut(),
        &ctx.resolve_options(),
        &AtomicBool::new(false),
    )
    .with_context(|| format!("Failed to resolve {}", path.display()))?;

    let texts = match format {
        PlaylistFormat::M3u => playlist::m3u(&album)?,
        PlaylistFormat::Cue => playlist::cue(&album)?,
    };
    println!("{}", texts.join("\n\n"));
    Ok(())
}
