//! Resolved album model.
//!
//! Defines the primary entities: [`Album`], [`Disc`] and [`Track`].
//! They are built once by the resolver from a directory snapshot and never
//! modified afterwards.

use std::path::PathBuf;

use crate::classify::RawFile;
use crate::cue::models::Timestamp;

/// Where a track's audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSpan {
    /// Part of a merged audio file
    Clip {
        start: Timestamp,
        /// `None`: to the end of the file
        duration: Option<Timestamp>,
    },
    /// A file of its own
    File { path: PathBuf, ext: String },
}

/// A track of a disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Track number as declared (cue `TRACK` or `track` tag)
    pub number: u32,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub span: TrackSpan,
}

/// Audio backing a disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscSource {
    /// One audio file cut into tracks by a cue sheet
    Merged {
        audio: PathBuf,
        /// Cue came from the audio file's tags rather than a sidecar
        embedded: bool,
        /// Sidecar cue file, if any
        cue: Option<PathBuf>,
    },
    /// One audio file per track
    Split { files: Vec<PathBuf> },
}

/// A disc of an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disc {
    /// 1-based, in the order discs were built
    pub number: u32,
    /// Album name as found for this disc (slash-safe, not normalized)
    pub album: String,
    /// Artist for this disc (slash-safe)
    pub artist: String,
    pub source: DiscSource,
    pub tracks: Vec<Track>,
}

impl Disc {
    pub fn is_merged(&self) -> bool {
        matches!(self.source, DiscSource::Merged { .. })
    }

    pub fn is_split(&self) -> bool {
        matches!(self.source, DiscSource::Split { .. })
    }

    /// Cue sheet came from the audio container.
    pub fn cue_embedded(&self) -> bool {
        matches!(self.source, DiscSource::Merged { embedded: true, .. })
    }

    /// Merged audio file.
    pub fn audio_file(&self) -> Option<&PathBuf> {
        match &self.source {
            DiscSource::Merged { audio, .. } => Some(audio),
            DiscSource::Split { .. } => None,
        }
    }
}

/// A resolved album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    /// Normalized album name shared by all discs
    pub name: String,
    /// Most frequent disc artist
    pub artist: String,
    pub discs: Vec<Disc>,
    pub cover: Option<RawFile>,
    pub booklets: Vec<RawFile>,
    /// Logs and sidecar cue files
    pub logs: Vec<RawFile>,
    pub videos: Vec<RawFile>,
}

impl Album {
    pub fn track_count(&self) -> usize {
        self.discs.iter().map(|d| d.tracks.len()).sum()
    }
}
