//! Test utilities and fixtures for album-detector tests.
//!
//! This module provides a scripted prober and prompter, common magic strings,
//! and helpers that lay out album directories on disk.
//!
//! # Example
//!
//! ```ignore
//! use album_detector::test_utils::{FakeProber, fixture_file, FLAC_SIGNATURE};
//!
//! #[test]
//! fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     let mut prober = FakeProber::default();
//!     fixture_file(&mut prober, dir.path(), "01.flac", FLAC_SIGNATURE, &[("track", "1")]);
//!     // ... test logic
//! }
//! ```

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::hints::Prompter;
use crate::metadata::TagMap;
use crate::probe::FileProber;

pub const FLAC_SIGNATURE: &str = "FLAC audio bitstream data, 16 bit, stereo, 44.1 kHz";
pub const MP3_SIGNATURE: &str = "Audio file with ID3 version 2.3.0, contains: MPEG ADTS, layer III";
pub const JPEG_SIGNATURE: &str = "JPEG image data, JFIF standard 1.01";
pub const TEXT_SIGNATURE: &str = "UTF-8 Unicode text, with CRLF line terminators";

/// Prober answering from a table instead of looking at file content.
///
/// Unregistered paths fail with [`Error::Probe`].
#[derive(Debug, Default, Clone)]
pub struct FakeProber {
    reports: HashMap<PathBuf, FakeReport>,
}

#[derive(Debug, Clone)]
struct FakeReport {
    signature: String,
    tags: Option<TagMap>,
}

impl FakeProber {
    /// Register the signature and tags for a path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, signature: &str, tags: Option<TagMap>) {
        self.reports.insert(
            path.into(),
            FakeReport {
                signature: signature.to_string(),
                tags,
            },
        );
    }

    fn report(&self, path: &Path) -> Result<&FakeReport> {
        self.reports
            .get(path)
            .ok_or_else(|| Error::probe(path, "not registered with FakeProber"))
    }
}

impl FileProber for FakeProber {
    fn signature(&self, path: &Path) -> Result<String> {
        Ok(self.report(path)?.signature.clone())
    }

    fn tags(&self, path: &Path) -> Result<Option<TagMap>> {
        Ok(self.report(path)?.tags.clone())
    }
}

/// Prompter that replays canned answers in order.
///
/// Running out of answers is an error, so a test fails loudly when the code
/// asks more often than expected.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Keys asked so far, in order
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<'a>(answers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            answers: answers.into_iter().map(str::to_string).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, scope: &Path, key: &str, _prompt: &str, _choices: &[String]) -> Result<String> {
        self.asked.push(key.to_string());
        self.answers.pop_front().ok_or_else(|| Error::HintRequired {
            scope: scope.to_path_buf(),
            key: key.to_string(),
        })
    }
}

/// Build a tag map from key/value pairs.
pub fn tag_map(pairs: &[(&str, &str)]) -> TagMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Cue sheet text with `tracks` tracks, three minutes apart.
pub fn embedded_cue_sheet(artist: &str, album: &str, file: &str, tracks: u32) -> String {
    let mut text = format!(
        "REM GENRE Rock\nREM DATE 1999\nPERFORMER \"{artist}\"\nTITLE \"{album}\"\nFILE \"{file}\" WAVE\n"
    );
    for n in 1..=tracks {
        text.push_str(&format!(
            "  TRACK {n:02} AUDIO\n    TITLE \"Track {n}\"\n    INDEX 01 {:02}:00:00\n",
            (n - 1) * 3
        ));
    }
    text
}

/// Create an empty file under `dir` and register it with the prober.
///
/// Tags are registered only when `tags` is non-empty.
pub fn fixture_file(
    prober: &mut FakeProber,
    dir: &Path,
    name: &str,
    signature: &str,
    tags: &[(&str, &str)],
) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(&path, b"").expect("Failed to write fixture file");

    let tags = (!tags.is_empty()).then(|| tag_map(tags));
    prober.insert(&path, signature, tags);
    path
}

/// Lay out a two-track split album under `dir`.
pub fn split_album_fixture(prober: &mut FakeProber, dir: &Path, artist: &str, album: &str) {
    for n in 1..=2 {
        let track = n.to_string();
        let title = format!("Song {n}");
        fixture_file(
            prober,
            dir,
            &format!("{n:02}.flac"),
            FLAC_SIGNATURE,
            &[
                ("track", &track),
                ("title", &title),
                ("artist", artist),
                ("album", album),
            ],
        );
    }
    fixture_file(prober, dir, "cover.jpg", JPEG_SIGNATURE, &[]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue;

    #[test]
    fn test_fake_prober_unregistered_path() {
        let prober = FakeProber::default();
        assert!(matches!(
            prober.signature(Path::new("/nowhere")),
            Err(Error::Probe { .. })
        ));
    }

    #[test]
    fn test_scripted_prompter_runs_out() {
        let mut prompter = ScriptedPrompter::new(["one"]);
        let scope = Path::new("/album");
        assert_eq!(prompter.ask(scope, "k", "?", &[]).unwrap(), "one");
        assert!(prompter.ask(scope, "k", "?", &[]).is_err());
        assert_eq!(prompter.asked, ["k", "k"]);
    }

    #[test]
    fn test_embedded_cue_sheet_parses() {
        let sheet = cue::parse(&embedded_cue_sheet("A", "B", "b.flac", 4)).unwrap();
        assert_eq!(sheet.tracks.len(), 4);
        assert_eq!(sheet.header.file.as_deref(), Some("b.flac"));
        assert_eq!(sheet.tracks[3].title.as_deref(), Some("Track 4"));
    }

    #[test]
    fn test_fixture_file_registers() {
        let dir = tempfile::tempdir().unwrap();
        let mut prober = FakeProber::default();
        let path = fixture_file(&mut prober, dir.path(), "sub/01.flac", FLAC_SIGNATURE, &[("track", "1")]);
        assert!(path.is_file());
        assert_eq!(prober.tags(&path).unwrap().unwrap()["track"], "1");
    }
}
