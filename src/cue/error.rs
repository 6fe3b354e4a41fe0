use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Unknown cue line {line_no}: {line} (bytes: {bytes:?})")]
    UnrecognizedLine {
        line_no: usize,
        line: String,
        bytes: Vec<u8>,
    },

    #[error("Track directive before any TRACK line (line {line_no}): {line}")]
    DirectiveOutsideTrack { line_no: usize, line: String },

    #[error("Invalid track number on line {line_no}: {line}")]
    InvalidTrackNumber { line_no: usize, line: String },

    #[error("Invalid INDEX time on line {line_no}: {line}")]
    InvalidIndex { line_no: usize, line: String },

    #[error("Track {track} has no INDEX 01")]
    MissingIndex { track: u32 },

    #[error("Track {track} starts before the previous track")]
    NonMonotonicIndex { track: u32 },

    #[error("Cannot determine the character encoding of {path}")]
    UnresolvableEncoding { path: PathBuf },
}

pub type CueResult<T> = Result<T, CueError>;
