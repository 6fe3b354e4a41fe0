//! Export planning.
//!
//! Turns a resolved [`Album`] into an ordered list of [`Operation`]s that lay
//! the album out under `output_root/artist/album/`:
//!
//! ```text
//! cover.<ext>
//! images/      booklet scans
//! logs/        rip logs and sidecar cues
//! mv/          videos
//! disc1-01.flac, disc1-02.flac, ...
//! ```
//!
//! The plan is plain data. [`shell::render`] prints it as shell commands,
//! [`execute::Executor`] carries it out. Directories are always created
//! before anything is placed in them, and permissions are normalized last.

pub mod execute;
pub mod playlist;
pub mod shell;

use std::path::{Path, PathBuf};

use crate::classify::RawFile;
use crate::cue::models::Timestamp;
use crate::model::{Album, Disc, TrackSpan};

/// File mode applied to every exported file.
pub const FILE_MODE: u32 = 0o644;

/// One track cut out of a merged audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSpec {
    pub source: PathBuf,
    pub start: Timestamp,
    /// `None`: to the end of the source
    pub duration: Option<Timestamp>,
    /// Tags written to the clip, in order
    pub metadata: Vec<(String, String)>,
    pub dest: PathBuf,
}

/// A single export step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    MakeDirectory(PathBuf),
    CopyFile { src: PathBuf, dst: PathBuf },
    ExportClip(ClipSpec),
    /// Set `mode` on every file below `root`
    SetPermissions { root: PathBuf, mode: u32 },
}

impl Operation {
    /// Path this operation writes.
    pub fn target(&self) -> &Path {
        match self {
            Self::MakeDirectory(path) => path,
            Self::CopyFile { dst, .. } => dst,
            Self::ExportClip(clip) => &clip.dest,
            Self::SetPermissions { root, .. } => root,
        }
    }
}

/// Album directory under the output root.
pub fn album_dir(album: &Album, output_root: &Path) -> PathBuf {
    output_root.join(&album.artist).join(&album.name)
}

/// Output file name of a track: `disc<N>-<NN>.<ext>`.
pub fn track_file_name(disc: u32, track: u32, ext: &str) -> String {
    format!("disc{disc}-{track:02}.{ext}")
}

/// Plan the export of an album.
///
/// With `audio_only`, booklets, logs and videos are left out; the cover is
/// still copied.
pub fn plan(album: &Album, output_root: &Path, audio_only: bool) -> Vec<Operation> {
    let root = album_dir(album, output_root);
    let mut ops = vec![Operation::MakeDirectory(root.clone())];

    if let Some(cover) = &album.cover {
        ops.push(Operation::CopyFile {
            src: cover.path.clone(),
            dst: root.join(format!("cover.{}", cover.ext)),
        });
    }

    if !audio_only {
        if album.cover.is_some() || !album.booklets.is_empty() {
            ops.push(Operation::MakeDirectory(root.join("images")));
        }
        copy_into(&mut ops, &album.booklets, &root.join("images"));

        if !album.logs.is_empty() {
            ops.push(Operation::MakeDirectory(root.join("logs")));
        }
        copy_into(&mut ops, &album.logs, &root.join("logs"));

        if !album.videos.is_empty() {
            ops.push(Operation::MakeDirectory(root.join("mv")));
        }
        copy_into(&mut ops, &album.videos, &root.join("mv"));
    }

    for disc in &album.discs {
        plan_disc(&mut ops, disc, &root);
    }

    ops.push(Operation::SetPermissions {
        root,
        mode: FILE_MODE,
    });
    ops
}

fn copy_into(ops: &mut Vec<Operation>, files: &[RawFile], dir: &Path) {
    for file in files {
        ops.push(Operation::CopyFile {
            src: file.path.clone(),
            dst: dir.join(&file.basename),
        });
    }
}

fn plan_disc(ops: &mut Vec<Operation>, disc: &Disc, root: &Path) {
    let total = disc.tracks.len();

    for track in &disc.tracks {
        match &track.span {
            TrackSpan::Clip { start, duration } => {
                let Some(source) = disc.audio_file() else {
                    continue;
                };
                let mut metadata = vec![
                    ("artist".to_string(), track.artist.clone()),
                    ("title".to_string(), track.title.clone()),
                    ("album".to_string(), track.album.clone()),
                    ("track".to_string(), format!("{}/{}", track.number, total)),
                ];
                if disc.cue_embedded() {
                    // drop the cue copied over from the source container
                    metadata.push(("cuesheet".to_string(), String::new()));
                }
                ops.push(Operation::ExportClip(ClipSpec {
                    source: source.clone(),
                    start: *start,
                    duration: *duration,
                    metadata,
                    dest: root.join(track_file_name(disc.number, track.number, "flac")),
                }));
            }
            TrackSpan::File { path, ext } => ops.push(Operation::CopyFile {
                src: path.clone(),
                dst: root.join(track_file_name(disc.number, track.number, ext)),
            }),
        }
    }
}
