//! Directory snapshots.
//!
//! An album directory is captured once per run as a list of [`RawFile`]s.
//! Everything downstream works on that list and never looks at the disk
//! again, except for cue files which are read when they are parsed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

use crate::classify::{self, ClassifyOptions, EntryKind, RawFile};
use crate::error::{Error, Result, ResultExt};
use crate::probe::FileProber;

/// Probe every entry below `root` (the root itself excluded).
///
/// Entries are visited in file-name order. Directories are recorded without
/// probing; tags are read only for files classified as audio. `interrupt` is
/// checked before each entry.
pub fn snapshot(
    root: &Path,
    prober: &dyn FileProber,
    options: ClassifyOptions,
    interrupt: &AtomicBool,
) -> Result<Vec<RawFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        if interrupt.load(Ordering::SeqCst) {
            tracing::warn!("Interrupted while scanning {:?}", root);
            return Err(Error::Interrupted);
        }
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();

        if path.is_dir() {
            let empty = std::fs::read_dir(path)
                .with_context(format!("Failed to list {:?}", path))?
                .next()
                .is_none();
            let kind = if empty { EntryKind::EmptyDir } else { EntryKind::Dir };
            files.push(RawFile::new(path, kind, "", None));
            continue;
        }

        let signature = prober.signature(path)?;
        let mut file = RawFile::new(path, EntryKind::File, signature, None);
        if classify::classify(&file, options).is_audio() {
            file.tags = prober.tags(path)?;
        }
        files.push(file);
    }

    tracing::debug!("Snapshot of {:?}: {} entries", root, files.len());
    Ok(files)
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn album_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .with_context(format!("Failed to list {:?}", root))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}
