//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - [`StructuralError`]: one variant per album layout the resolver refuses
//! - [`CueError`]: cue sheet parsing and decoding failures
//!
//! Every variant is terminal for the album being processed. The batch driver
//! records the failure and moves on; single-album commands surface it.

use std::path::PathBuf;

pub use crate::cue::error::CueError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported album layout
    #[error("Unsupported album layout: {0}")]
    Structural(#[from] StructuralError),

    /// Cue sheet could not be read or parsed
    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    /// A hint is needed but prompting is disabled
    #[error("Hint '{key}' required for {scope} (non-interactive mode)")]
    HintRequired { scope: PathBuf, key: String },

    /// Hint file could not be read or written
    #[error("Hint store error for {path}: {message}")]
    HintStore { path: PathBuf, message: String },

    /// File prober failed
    #[error("Probe error for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// Plan could not be produced or executed
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Batch run stopped by the user
    #[error("Interrupted")]
    Interrupted,

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Album layouts the resolver does not support.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    #[error("unknown file {path} (magic string: {signature})")]
    UnknownFile { path: PathBuf, signature: String },

    #[error("no audio files found")]
    NoAudio,

    #[error("lossless and lossy audio are mixed and mixing was not confirmed")]
    MixedAudioRejected,

    #[error("{with} audio files carry an embedded cue but {without} do not")]
    MixedEmbeddedCue { with: usize, without: usize },

    #[error("cue {cue} could be bound to several audio files: {candidates:?}")]
    AmbiguousCueAudio {
        cue: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("none of the cue files references an audio file")]
    UnboundCues,

    #[error("cue sheet for {audio} has no tracks")]
    EmptyCue { audio: PathBuf },

    #[error("audio file {path} has no track number")]
    MissingTrackNumber { path: PathBuf },

    #[error("cannot divide audio files into discs")]
    CannotDivideDiscs,

    #[error("disc {disc} track {track} has no {field}")]
    IncompleteTrack {
        disc: u32,
        track: u32,
        field: &'static str,
    },
}

impl Error {
    /// Create a hint-store error.
    pub fn hint_store(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::HintStore {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a probe error.
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an export error.
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether the batch driver must stop instead of skipping the album.
    pub fn is_interrupt(&self) -> bool {
        match self {
            Self::Interrupted => true,
            Self::WithContext { source, .. } => source.is_interrupt(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
