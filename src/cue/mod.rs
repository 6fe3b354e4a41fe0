//! Cue sheet parsing.
//!
//! The parser is strict: every non-blank line must match one of the known
//! directives, otherwise parsing stops with [`CueError::UnrecognizedLine`].
//! Indentation is part of the grammar (`  TRACK`, `    TITLE`), as written
//! by common rippers.

use std::path::{Path, PathBuf};

use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueHeader, CueSheet, CueTrack, Timestamp};

pub mod encoding;
pub mod error;
pub mod models;

/// Top-level remarks and directives that carry nothing we keep.
const IGNORED_HEADER: &[&str] = &[
    "REM DISCNUMBER ",
    "REM TOTALDISCS ",
    "REM ACCURATERIPID ",
    "REM CATALOG ",
    "REM DISCID ",
    "REM COMMENT ",
    "REM REPLAYGAIN_TRACK_GAIN ",
    "REM REPLAYGAIN_ALBUM_GAIN ",
    "REM REPLAYGAIN_ALBUM_PEAK ",
    "REM COMPOSER ",
    "SONGWRITER ",
    "CATALOG ",
];

/// Track-level directives that carry nothing we keep.
const IGNORED_TRACK: &[&str] = &[
    "    SONGWRITER ",
    "    ISRC ",
    "    REM ",
    "    FLAGS ",
    "    PREGAP ",
    "    INDEX 00 ",
    "    INDEX 02 ",
    "    INDEX 03 ",
];

/// A track while its lines are still being read.
struct PendingTrack {
    number: u32,
    title: Option<String>,
    artist: Option<String>,
    header: CueHeader,
    start: Option<Timestamp>,
}

impl PendingTrack {
    fn new(number: u32, header: &CueHeader) -> Self {
        Self {
            number,
            title: None,
            artist: header.artist.clone(),
            header: header.clone(),
            start: None,
        }
    }
}

/// Parse cue sheet text into a header and an ordered track list.
pub fn parse(text: &str) -> CueResult<CueSheet> {
    let text = text.replace('\u{feff}', "").replace("\r\n", "\n");

    let mut header = CueHeader::default();
    let mut pending: Vec<PendingTrack> = Vec::new();

    for (idx, line) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        if IGNORED_HEADER.iter().any(|p| line.starts_with(p))
            || IGNORED_TRACK.iter().any(|p| line.starts_with(p))
        {
            continue;
        }

        if let Some(rest) = line.strip_prefix("REM GENRE ") {
            header.genre = value(rest);
        } else if let Some(rest) = line.strip_prefix("REM DATE ") {
            header.date = value(rest);
        } else if let Some(rest) = line.strip_prefix("PERFORMER ") {
            header.artist = value(rest);
        } else if let Some(rest) = line.strip_prefix("TITLE ") {
            header.album = value(rest);
        } else if let Some(rest) = line.strip_prefix("FILE ") {
            header.file = file_value(rest);
        } else if let Some(rest) = line.strip_prefix("  TRACK ") {
            let number = rest
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<u32>().ok())
                .ok_or_else(|| CueError::InvalidTrackNumber {
                    line_no,
                    line: line.to_string(),
                })?;
            pending.push(PendingTrack::new(number, &header));
        } else if let Some(rest) = line.strip_prefix("    TITLE ") {
            current(&mut pending, line_no, line)?.title = value(rest);
        } else if let Some(rest) = line.strip_prefix("    PERFORMER ") {
            current(&mut pending, line_no, line)?.artist = value(rest);
        } else if let Some(rest) = line.strip_prefix("    INDEX 01 ") {
            let start = parse_msf(rest).ok_or_else(|| CueError::InvalidIndex {
                line_no,
                line: line.to_string(),
            })?;
            current(&mut pending, line_no, line)?.start = Some(start);
        } else {
            return Err(CueError::UnrecognizedLine {
                line_no,
                line: line.to_string(),
                bytes: line.as_bytes().to_vec(),
            });
        }
    }

    let tracks = finish(pending)?;
    Ok(CueSheet { header, tracks })
}

fn current<'a>(
    pending: &'a mut [PendingTrack],
    line_no: usize,
    line: &str,
) -> CueResult<&'a mut PendingTrack> {
    pending
        .last_mut()
        .ok_or_else(|| CueError::DirectiveOutsideTrack {
            line_no,
            line: line.to_string(),
        })
}

/// Check starts and compute durations.
fn finish(pending: Vec<PendingTrack>) -> CueResult<Vec<CueTrack>> {
    let mut tracks: Vec<CueTrack> = Vec::with_capacity(pending.len());

    for p in pending {
        let start = p.start.ok_or(CueError::MissingIndex { track: p.number })?;

        if let Some(prev) = tracks.last_mut() {
            let duration = start
                .checked_sub(prev.start)
                .filter(|d| d.centiseconds() > 0)
                .ok_or(CueError::NonMonotonicIndex { track: p.number })?;
            prev.duration = Some(duration);
        }

        tracks.push(CueTrack {
            number: p.number,
            title: p.title,
            artist: p.artist,
            album: p.header.album,
            genre: p.header.genre,
            date: p.header.date,
            file: p.header.file,
            start,
            duration: None,
        });
    }

    Ok(tracks)
}

/// Rejoin words with single spaces and strip the surrounding quotes.
fn value(rest: &str) -> Option<String> {
    let joined = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = joined.trim_matches('"');
    (!stripped.is_empty()).then(|| stripped.to_string())
}

/// `FILE "name with spaces.flac" WAVE`: the last word is the format.
fn file_value(rest: &str) -> Option<String> {
    let words: Vec<&str> = rest.split_whitespace().collect();
    let name = words.split_last().map(|(_, name)| name).unwrap_or_default();
    value(&name.join(" "))
}

/// Path named by a `FILE` reference, relative to the cue's directory.
///
/// Cues written on Windows separate directories with backslashes.
pub fn referenced_path(dir: &Path, reference: &str) -> PathBuf {
    dir.join(reference.replace('\\', "/"))
}

fn parse_msf(rest: &str) -> Option<Timestamp> {
    let joined = value(rest)?;
    let parts: Vec<u32> = joined
        .split(':')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [m, s, f] => Timestamp::from_msf(*m, *s, *f),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EAC_CUE: &str = concat!(
        "\u{feff}REM GENRE Anime\r\n",
        "REM DATE 2009\r\n",
        "REM DISCID 8C0A6B0B\r\n",
        "REM COMMENT \"ExactAudioCopy v0.99pb5\"\r\n",
        "PERFORMER \"Various Artists\"\r\n",
        "TITLE \"Sound Collection (Disc 1)\"\r\n",
        "FILE \"Sound Collection CD1.flac\" WAVE\r\n",
        "  TRACK 01 AUDIO\r\n",
        "    TITLE \"Opening Theme\"\r\n",
        "    PERFORMER \"Alice\"\r\n",
        "    FLAGS DCP\r\n",
        "    INDEX 01 00:00:00\r\n",
        "  TRACK 02 AUDIO\r\n",
        "    TITLE \"Second  Song\"\r\n",
        "    ISRC JPA000000001\r\n",
        "    INDEX 00 03:18:40\r\n",
        "    INDEX 01 03:20:50\r\n",
        "  TRACK 03 AUDIO\r\n",
        "    TITLE \"Ending\"\r\n",
        "    PERFORMER \"Bob\"\r\n",
        "    INDEX 01 07:02:10\r\n",
    );

    #[test]
    fn test_parse_header() {
        let sheet = parse(EAC_CUE).unwrap();
        assert_eq!(sheet.header.artist.as_deref(), Some("Various Artists"));
        assert_eq!(sheet.header.album.as_deref(), Some("Sound Collection (Disc 1)"));
        assert_eq!(sheet.header.file.as_deref(), Some("Sound Collection CD1.flac"));
        assert_eq!(sheet.header.genre.as_deref(), Some("Anime"));
        assert_eq!(sheet.header.date.as_deref(), Some("2009"));
    }

    #[test]
    fn test_parse_tracks_inherit_and_override() {
        let sheet = parse(EAC_CUE).unwrap();
        assert_eq!(sheet.tracks.len(), 3);

        let first = &sheet.tracks[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.title.as_deref(), Some("Opening Theme"));
        assert_eq!(first.artist.as_deref(), Some("Alice"));
        assert_eq!(first.album.as_deref(), Some("Sound Collection (Disc 1)"));
        assert_eq!(first.genre.as_deref(), Some("Anime"));

        // no PERFORMER of its own: header artist
        assert_eq!(sheet.tracks[1].artist.as_deref(), Some("Various Artists"));
        // whitespace runs collapse
        assert_eq!(sheet.tracks[1].title.as_deref(), Some("Second Song"));
    }

    #[test]
    fn test_parse_starts_and_durations() {
        let sheet = parse(EAC_CUE).unwrap();
        let starts: Vec<u32> = sheet.tracks.iter().map(|t| t.start.centiseconds()).collect();
        assert_eq!(starts, vec![0, 20050, 42210]);

        assert_eq!(sheet.tracks[0].duration, Some(Timestamp(20050)));
        assert_eq!(sheet.tracks[1].duration, Some(Timestamp(22160)));
        assert_eq!(sheet.tracks[2].duration, None);
    }

    #[test]
    fn test_track_copies_header_at_track_time() {
        let text = "TITLE \"First\"\n  TRACK 01 AUDIO\n    TITLE \"a\"\n    INDEX 01 00:00:00\nTITLE \"Second\"\n  TRACK 02 AUDIO\n    TITLE \"b\"\n    INDEX 01 01:00:00\n";
        let sheet = parse(text).unwrap();
        assert_eq!(sheet.tracks[0].album.as_deref(), Some("First"));
        assert_eq!(sheet.tracks[1].album.as_deref(), Some("Second"));
        assert_eq!(sheet.header.album.as_deref(), Some("Second"));
    }

    #[test]
    fn test_missing_album_is_surfaced_not_guessed() {
        let text = "PERFORMER \"A\"\nFILE \"a.flac\" WAVE\n  TRACK 01 AUDIO\n    TITLE \"x\"\n    INDEX 01 00:00:00\n";
        let sheet = parse(text).unwrap();
        assert_eq!(sheet.header.album, None);
        assert_eq!(sheet.tracks[0].album, None);
    }

    #[test]
    fn test_unrecognized_line_is_error() {
        let text = "PERFORMER \"A\"\nPOSTGAP 00:02:00\n";
        match parse(text) {
            Err(CueError::UnrecognizedLine { line_no, line, bytes }) => {
                assert_eq!(line_no, 2);
                assert_eq!(line, "POSTGAP 00:02:00");
                assert_eq!(bytes, b"POSTGAP 00:02:00".to_vec());
            }
            other => panic!("expected UnrecognizedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_indentation_is_unrecognized() {
        let text = "TRACK 01 AUDIO\n";
        assert!(matches!(parse(text), Err(CueError::UnrecognizedLine { .. })));
    }

    #[test]
    fn test_title_before_track_is_error() {
        let text = "    TITLE \"orphan\"\n";
        assert!(matches!(parse(text), Err(CueError::DirectiveOutsideTrack { .. })));
    }

    #[test]
    fn test_bad_track_number() {
        let text = "  TRACK xx AUDIO\n";
        assert!(matches!(parse(text), Err(CueError::InvalidTrackNumber { .. })));
    }

    #[test]
    fn test_bad_index() {
        let text = "  TRACK 01 AUDIO\n    INDEX 01 00:00\n";
        assert!(matches!(parse(text), Err(CueError::InvalidIndex { .. })));
    }

    #[test]
    fn test_oversized_index_is_error() {
        let text = "  TRACK 01 AUDIO\n    INDEX 01 99999999:00:00\n";
        assert!(matches!(parse(text), Err(CueError::InvalidIndex { line_no: 2, .. })));
    }

    #[test]
    fn test_index_fields_out_of_range() {
        let seconds = "  TRACK 01 AUDIO\n    INDEX 01 03:60:00\n";
        assert!(matches!(parse(seconds), Err(CueError::InvalidIndex { .. })));
        let frames = "  TRACK 01 AUDIO\n    INDEX 01 03:20:75\n";
        assert!(matches!(parse(frames), Err(CueError::InvalidIndex { .. })));
    }

    #[test]
    fn test_missing_index() {
        let text = "  TRACK 01 AUDIO\n    TITLE \"x\"\n";
        assert!(matches!(parse(text), Err(CueError::MissingIndex { track: 1 })));
    }

    #[test]
    fn test_decreasing_index() {
        let text = "  TRACK 01 AUDIO\n    INDEX 01 01:00:00\n  TRACK 02 AUDIO\n    INDEX 01 00:30:00\n";
        assert!(matches!(parse(text), Err(CueError::NonMonotonicIndex { track: 2 })));
    }

    #[test]
    fn test_track_numbers_need_not_be_contiguous() {
        let text = "  TRACK 03 AUDIO\n    INDEX 01 00:00:00\n  TRACK 07 AUDIO\n    INDEX 01 00:10:00\n";
        let sheet = parse(text).unwrap();
        let numbers: Vec<u32> = sheet.tracks.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![3, 7]);
    }

    #[test]
    fn test_referenced_path_accepts_backslashes() {
        let dir = Path::new("/music/Album");
        assert_eq!(referenced_path(dir, "album.flac"), dir.join("album.flac"));
        assert_eq!(referenced_path(dir, "CD1\\album.flac"), dir.join("CD1/album.flac"));
    }

    #[test]
    fn test_empty_text() {
        let sheet = parse("").unwrap();
        assert!(sheet.tracks.is_empty());
        assert_eq!(sheet.header, CueHeader::default());
    }
}
