//! Playlist and cue regeneration.
//!
//! Split albums become one `.m3u` list per disc; merged albums get their cue
//! sheets rewritten from the resolved tracks. An album that mixes both kinds
//! of disc supports neither.

use crate::cue::models::{CueHeader, CueSheet, CueTrack};
use crate::error::{Error, Result};
use crate::model::{Album, Disc, TrackSpan};

/// One `.m3u` body per disc, file paths separated by newlines.
pub fn m3u(album: &Album) -> Result<Vec<String>> {
    require_all(album, Disc::is_split, "m3u", "split")?;

    Ok(album
        .discs
        .iter()
        .map(|disc| {
            disc.tracks
                .iter()
                .filter_map(|track| match &track.span {
                    TrackSpan::File { path, .. } => Some(path.display().to_string()),
                    TrackSpan::Clip { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n")
                .replace('[', "%5b")
                .replace(']', "%5d")
        })
        .collect())
}

/// One regenerated cue text per disc.
pub fn cue(album: &Album) -> Result<Vec<String>> {
    require_all(album, Disc::is_merged, "cue", "merged")?;

    Ok(album
        .discs
        .iter()
        .map(|disc| cue_sheet(album, disc).to_cue_text())
        .collect())
}

fn cue_sheet(album: &Album, disc: &Disc) -> CueSheet {
    let header = CueHeader {
        artist: Some(album.artist.clone()),
        album: disc.tracks.first().map(|t| t.album.clone()),
        file: disc.audio_file().map(|p| p.display().to_string()),
        genre: None,
        date: None,
    };

    let tracks = disc
        .tracks
        .iter()
        .filter_map(|track| match track.span {
            TrackSpan::Clip { start, duration } => Some(CueTrack {
                number: track.number,
                title: Some(track.title.clone()),
                artist: Some(track.artist.clone()),
                album: Some(track.album.clone()),
                genre: track.genre.clone(),
                date: track.date.clone(),
                file: header.file.clone(),
                start,
                duration,
            }),
            TrackSpan::File { .. } => None,
        })
        .collect();

    CueSheet { header, tracks }
}

fn require_all(album: &Album, pred: fn(&Disc) -> bool, format: &str, kind: &str) -> Result<()> {
    if let Some(disc) = album.discs.iter().find(|d| !pred(d)) {
        return Err(Error::export(format!(
            "{format} export needs every disc to be {kind}, disc {} is not",
            disc.number
        )));
    }
    Ok(())
}
