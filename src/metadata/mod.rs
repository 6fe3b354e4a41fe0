//! Audio file tag reading.
//!
//! Uses the lofty crate for format-independent metadata access and flattens
//! the primary tag into a lowercase-keyed [`TagMap`], the shape the rest of
//! the pipeline consumes. An embedded cue sheet ends up under `cuesheet`.

use lofty::error::ErrorKind;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Lowercase tag name to value.
pub type TagMap = BTreeMap<String, String>;

/// Tag key holding embedded cue sheet text.
pub const CUESHEET_KEY: &str = "cuesheet";

/// Read the tags of an audio file.
///
/// Returns `Ok(None)` when the container has no tag at all, or when lofty
/// does not know the format (TAK, WMA). Such files are still usable through
/// a sidecar cue sheet.
pub fn read(path: &Path) -> Result<Option<TagMap>> {
    let probe = Probe::open(path)
        .map_err(|e| Error::probe(path, format!("failed to open file for probing: {e}")))?
        .guess_file_type()
        .map_err(|e| Error::probe(path, format!("failed to read file header: {e}")))?;

    let tagged_file = match probe.read() {
        Ok(file) => file,
        Err(e) if matches!(e.kind(), ErrorKind::UnknownFormat) => {
            tracing::debug!("No tag reader for {:?}: {}", path, e);
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::probe(path, format!("failed to read file metadata: {e}")));
        }
    };

    // Get the primary tag, or fall back to the first available tag
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return Ok(None);
    };

    Ok(Some(tag_map(tag)))
}

/// Flatten a lofty tag into a [`TagMap`].
fn tag_map(tag: &Tag) -> TagMap {
    let mut map = TagMap::new();

    if let Some(title) = tag.title() {
        map.insert("title".to_string(), title.to_string());
    }
    if let Some(artist) = tag.artist() {
        map.insert("artist".to_string(), artist.to_string());
    }
    if let Some(album) = tag.album() {
        map.insert("album".to_string(), album.to_string());
    }
    if let Some(genre) = tag.genre() {
        map.insert("genre".to_string(), genre.to_string());
    }
    if let Some(track) = tag.track() {
        let value = match tag.track_total() {
            Some(total) => format!("{track}/{total}"),
            None => track.to_string(),
        };
        map.insert("track".to_string(), value);
    }
    if let Some(disc) = tag.disk() {
        map.insert("disc".to_string(), disc.to_string());
    }
    if let Some(album_artist) = tag.get_string(&ItemKey::AlbumArtist) {
        map.insert("albumartist".to_string(), album_artist.to_string());
    }
    if let Some(date) = tag.get_string(&ItemKey::RecordingDate) {
        map.insert("date".to_string(), date.to_string());
    }

    // Cue sheets have no dedicated item key; they survive as unknown items
    for item in tag.items() {
        if let ItemKey::Unknown(key) = item.key()
            && key.eq_ignore_ascii_case(CUESHEET_KEY)
            && let Some(text) = item.value().text()
        {
            map.insert(CUESHEET_KEY.to_string(), text.to_string());
        }
    }

    map
}

/// Parse a `track` tag value: `"3"` or `"3/12"`.
pub fn track_number(tags: &TagMap) -> Option<u32> {
    let value = tags.get("track")?;
    let number = value.split('/').next()?.trim();
    number.parse().ok()
}
