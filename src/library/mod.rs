//! Album loading and batch scanning.
//!
//! [`load_album`] is the single-directory pipeline: snapshot, then resolve.
//! [`scan_albums`] runs it over every subdirectory of a library root, one at a
//! time, reporting each outcome and carrying on past failures. Only an
//! interrupt stops the batch early.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result, ResultExt};
use crate::hints::HintSource;
use crate::model::Album;
use crate::probe::FileProber;
use crate::resolver::{self, ResolveOptions};
use crate::scanner;

/// Snapshot and resolve one album directory.
pub fn load_album(
    dir: &Path,
    prober: &dyn FileProber,
    hints: &mut dyn HintSource,
    options: &ResolveOptions,
    interrupt: &AtomicBool,
) -> Result<Album> {
    let files = scanner::snapshot(dir, prober, options.classify, interrupt)
        .with_context(format!("Failed to scan {}", dir.display()))?;
    resolver::resolve(&files, dir, hints, options)
}

/// Outcome for one album directory.
#[derive(Debug)]
pub enum ScanEvent {
    Resolved { dir: PathBuf, album: Box<Album> },
    Failed { dir: PathBuf, error: Error },
}

/// Totals of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub resolved: usize,
    pub failed: Vec<PathBuf>,
}

impl ScanSummary {
    pub fn total(&self) -> usize {
        self.resolved + self.failed.len()
    }
}

/// Resolve every album directory below `root`, in name order.
///
/// `interrupt` is checked before each album and between the files of the
/// album being scanned; once set, the batch stops with [`Error::Interrupted`].
pub fn scan_albums(
    root: &Path,
    prober: &dyn FileProber,
    hints: &mut dyn HintSource,
    options: &ResolveOptions,
    interrupt: &AtomicBool,
    mut on_event: impl FnMut(ScanEvent),
) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();

    for dir in scanner::album_dirs(root)? {
        if interrupt.load(Ordering::SeqCst) {
            tracing::warn!(
                "Interrupted after {} of the albums in {:?}",
                summary.total(),
                root
            );
            return Err(Error::Interrupted);
        }

        match load_album(&dir, prober, hints, options, interrupt) {
            Ok(album) => {
                summary.resolved += 1;
                on_event(ScanEvent::Resolved {
                    dir,
                    album: Box::new(album),
                });
            }
            Err(e) if e.is_interrupt() => return Err(e),
            Err(e) => {
                tracing::error!("Skipping {:?}: {}", dir, e);
                summary.failed.push(dir.clone());
                on_event(ScanEvent::Failed { dir, error: e });
            }
        }
    }

    tracing::info!(
        "Scanned {:?}: {} resolved, {} failed",
        root,
        summary.resolved,
        summary.failed.len()
    );
    Ok(summary)
}

/// Index entry for one album directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub artist: String,
    pub album: String,
    pub discs: usize,
}

/// Resolved albums of a library, keyed by directory.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryIndex {
    pub generated_at: String,
    pub albums: BTreeMap<String, IndexEntry>,
}

impl Default for LibraryIndex {
    fn default() -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            albums: BTreeMap::new(),
        }
    }
}

/// Albums grouped by artist: `{ artist: { album: path } }`.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistView {
    pub generated_at: String,
    pub artists: BTreeMap<String, BTreeMap<String, String>>,
}

impl LibraryIndex {
    pub fn insert(&mut self, dir: &Path, album: &Album) {
        self.albums.insert(
            dir.display().to_string(),
            IndexEntry {
                artist: album.artist.clone(),
                album: album.name.clone(),
                discs: album.discs.len(),
            },
        );
    }

    pub fn by_artist(&self) -> ArtistView {
        let mut artists: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (path, entry) in &self.albums {
            artists
                .entry(entry.artist.clone())
                .or_default()
                .insert(entry.album.clone(), path.clone());
        }
        ArtistView {
            generated_at: self.generated_at.clone(),
            artists,
        }
    }

    pub fn to_json(&self, by_artist: bool) -> Result<String> {
        let json = if by_artist {
            serde_json::to_string_pretty(&self.by_artist())
        } else {
            serde_json::to_string_pretty(self)
        };
        json.map_err(|e| Error::export(format!("cannot serialize index: {e}")))
    }
}

/// Build an index of every album below `root` that resolves.
pub fn index(
    root: &Path,
    prober: &dyn FileProber,
    hints: &mut dyn HintSource,
    options: &ResolveOptions,
    interrupt: &AtomicBool,
) -> Result<(LibraryIndex, ScanSummary)> {
    let mut index = LibraryIndex::default();
    let summary = scan_albums(root, prober, hints, options, interrupt, |event| {
        if let ScanEvent::Resolved { dir, album } = event {
            index.insert(&dir, &album);
        }
    })?;
    Ok((index, summary))
}
