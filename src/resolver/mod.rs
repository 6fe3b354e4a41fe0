//! Album resolution.
//!
//! Turns the probed contents of one album directory into an [`Album`]:
//! classify every file, pick the working audio set, build discs from embedded
//! cues, sidecar cues or split tracks, then settle on one album name and
//! artist. Anything the rules cannot decide is either asked through the hint
//! store or rejected with a [`StructuralError`].

pub mod naming;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::classify::{self, ClassifyOptions, EntryKind, FileCategory, RawFile};
use crate::cue::{self, encoding, models::CueSheet};
use crate::error::{Result, StructuralError};
use crate::hints::{self, HintSource};
use crate::model::{Album, Disc, DiscSource, Track, TrackSpan};

pub use naming::{common_prefix, normalize_album_name, path_safe};

/// Resolution settings.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub classify: ClassifyOptions,
    /// Artist used for a split disc whose tracks disagree
    pub various_artists: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            classify: ClassifyOptions::default(),
            various_artists: "Various".to_string(),
        }
    }
}

impl From<&crate::config::Config> for ResolveOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            classify: ClassifyOptions {
                disc_images_as_garbage: config.classifier.disc_images_as_garbage,
            },
            various_artists: config.naming.various_artists.clone(),
        }
    }
}

/// Files of a directory sorted by category.
#[derive(Default)]
struct Buckets<'a> {
    cover: Option<&'a RawFile>,
    logs: Vec<&'a RawFile>,
    cues: Vec<&'a RawFile>,
    lossless: Vec<&'a RawFile>,
    lossy: Vec<&'a RawFile>,
    booklets: Vec<&'a RawFile>,
    videos: Vec<&'a RawFile>,
    unknown: Vec<&'a RawFile>,
}

impl<'a> Buckets<'a> {
    fn sort(files: &'a [RawFile], options: ClassifyOptions) -> Self {
        let mut buckets = Self::default();
        for file in files {
            match classify::classify(file, options) {
                FileCategory::NotFile | FileCategory::EmptyDir | FileCategory::Garbage => {}
                FileCategory::Log => buckets.logs.push(file),
                FileCategory::Cue => {
                    // sidecar cues are kept with the logs as well
                    buckets.logs.push(file);
                    buckets.cues.push(file);
                }
                FileCategory::Video => buckets.videos.push(file),
                FileCategory::AudioLossless => buckets.lossless.push(file),
                FileCategory::AudioLossy => buckets.lossy.push(file),
                FileCategory::Image => buckets.booklets.push(file),
                FileCategory::CoverImage => {
                    if buckets.cover.is_none() {
                        buckets.cover = Some(file);
                    } else {
                        tracing::debug!("Ignoring extra cover {:?}", file.path);
                    }
                }
                FileCategory::Unknown => buckets.unknown.push(file),
            }
        }
        buckets
    }
}

/// Resolve the files of one album directory.
///
/// `scope` is the album directory; hints are read from and saved to it.
pub fn resolve(
    files: &[RawFile],
    scope: &Path,
    hints: &mut dyn HintSource,
    options: &ResolveOptions,
) -> Result<Album> {
    let buckets = Buckets::sort(files, options.classify);

    if let Some(first) = buckets.unknown.first() {
        for file in &buckets.unknown {
            tracing::error!("Unknown file {:?} (magic string: {})", file.path, file.signature);
        }
        return Err(StructuralError::UnknownFile {
            path: first.path.clone(),
            signature: first.signature.clone(),
        }
        .into());
    }

    let audio = working_audio(&buckets, scope, hints)?;

    let mut builder = AlbumBuilder::new(scope, hints, options);
    let with_cue = audio.iter().filter(|a| a.embedded_cue().is_some()).count();

    if with_cue > 0 {
        if with_cue != audio.len() {
            return Err(StructuralError::MixedEmbeddedCue {
                with: with_cue,
                without: audio.len() - with_cue,
            }
            .into());
        }
        for file in &audio {
            let text = file.embedded_cue().unwrap_or_default();
            let sheet = cue::parse(text)?;
            builder.merged_disc(file.path.clone(), sheet, true, None)?;
        }
    } else if !buckets.cues.is_empty() {
        let mut bound: Vec<PathBuf> = Vec::new();
        for cue_file in &buckets.cues {
            let text = encoding::read_cue_file(&cue_file.path, scope, &mut *builder.hints)?;
            let sheet = cue::parse(&text)?;

            let Some(target) = bind_audio(cue_file, &sheet, files, &audio)? else {
                tracing::warn!("Cue {:?} references no audio file, skipping", cue_file.path);
                continue;
            };
            if bound.contains(&target) {
                tracing::warn!(
                    "Cue {:?} points at {:?} which is already bound, skipping",
                    cue_file.path,
                    target
                );
                continue;
            }
            bound.push(target.clone());
            builder.merged_disc(target, sheet, false, Some(cue_file.path.clone()))?;
        }
        if builder.discs.is_empty() {
            return Err(StructuralError::UnboundCues.into());
        }
    } else {
        for cluster in split_discs(&audio)? {
            builder.split_disc(cluster)?;
        }
    }

    let mut album = builder.finish()?;
    album.cover = buckets.cover.cloned();
    album.booklets = buckets.booklets.into_iter().cloned().collect();
    album.logs = buckets.logs.into_iter().cloned().collect();
    album.videos = buckets.videos.into_iter().cloned().collect();

    tracing::info!(
        "Resolved {:?}: {} - {} ({} discs, {} tracks)",
        scope,
        album.artist,
        album.name,
        album.discs.len(),
        album.track_count()
    );
    Ok(album)
}

/// Pick the audio files to work with.
///
/// When lossless and lossy files are mixed the user must confirm; the lossy
/// ones are then ignored.
fn working_audio<'a>(
    buckets: &Buckets<'a>,
    scope: &Path,
    hints: &mut dyn HintSource,
) -> Result<Vec<&'a RawFile>> {
    match (buckets.lossless.is_empty(), buckets.lossy.is_empty()) {
        (true, true) => Err(StructuralError::NoAudio.into()),
        (false, true) => Ok(buckets.lossless.clone()),
        (true, false) => Ok(buckets.lossy.clone()),
        (false, false) => {
            let prompt = format!(
                "{} lossless and {} lossy audio files found. Use the lossless ones only?",
                buckets.lossless.len(),
                buckets.lossy.len()
            );
            if hints::confirm(hints, scope, hints::KEY_MIXED_AUDIO, &prompt)? {
                tracing::info!("Ignoring {} lossy files in {:?}", buckets.lossy.len(), scope);
                Ok(buckets.lossless.clone())
            } else {
                Err(StructuralError::MixedAudioRejected.into())
            }
        }
    }
}

/// Find the audio file a sidecar cue describes.
///
/// The `FILE` reference wins when it names a file of the directory. Otherwise
/// the only working audio file in the cue's directory stands in for it.
fn bind_audio(
    cue_file: &RawFile,
    sheet: &CueSheet,
    files: &[RawFile],
    audio: &[&RawFile],
) -> Result<Option<PathBuf>> {
    if let Some(reference) = &sheet.header.file {
        let referenced = cue::referenced_path(&cue_file.dirname, reference);
        if files
            .iter()
            .any(|f| f.kind == EntryKind::File && f.path == referenced)
        {
            return Ok(Some(referenced));
        }
        tracing::debug!("Cue {:?} references missing {:?}", cue_file.path, referenced);
    }

    let candidates: Vec<PathBuf> = audio
        .iter()
        .filter(|a| a.dirname == cue_file.dirname)
        .map(|a| a.path.clone())
        .collect();

    match candidates.len() {
        0 => Ok(None),
        1 => {
            tracing::info!(
                "Binding cue {:?} to {:?} in place of its FILE reference",
                cue_file.path,
                candidates[0]
            );
            Ok(candidates.into_iter().next())
        }
        _ => Err(StructuralError::AmbiguousCueAudio {
            cue: cue_file.path.clone(),
            candidates,
        }
        .into()),
    }
}

/// Divide split audio files into discs.
///
/// Files are grouped by album tag first, then by directory. A grouping is
/// accepted only if track numbers are unique within every group.
fn split_discs<'a>(audio: &[&'a RawFile]) -> Result<Vec<Vec<&'a RawFile>>> {
    for file in audio {
        if file.track_number().is_none() {
            return Err(StructuralError::MissingTrackNumber {
                path: file.path.clone(),
            }
            .into());
        }
    }

    let by_album = cluster(audio, |f| f.tag("album").unwrap_or_default().to_string());
    if unique_track_numbers(&by_album) {
        return Ok(by_album);
    }

    let by_dir = cluster(audio, |f| f.dirname.to_string_lossy().into_owned());
    if unique_track_numbers(&by_dir) {
        tracing::debug!("Dividing discs by directory ({} discs)", by_dir.len());
        return Ok(by_dir);
    }

    Err(StructuralError::CannotDivideDiscs.into())
}

/// Group files by key, groups in order of first appearance.
fn cluster<'a>(audio: &[&'a RawFile], key: impl Fn(&RawFile) -> String) -> Vec<Vec<&'a RawFile>> {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<&'a RawFile>> = Vec::new();
    for file in audio {
        let k = key(file);
        match keys.iter().position(|existing| *existing == k) {
            Some(i) => groups[i].push(file),
            None => {
                keys.push(k);
                groups.push(vec![file]);
            }
        }
    }
    groups
}

fn unique_track_numbers(groups: &[Vec<&RawFile>]) -> bool {
    groups.iter().all(|group| {
        let numbers: BTreeSet<u32> = group.iter().filter_map(|f| f.track_number()).collect();
        numbers.len() == group.len()
    })
}

/// Distinct non-empty values, in order of first appearance.
fn distinct<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.into_iter().flatten() {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Builds discs in order and owns the disc counter.
struct AlbumBuilder<'h> {
    scope: &'h Path,
    hints: &'h mut dyn HintSource,
    options: &'h ResolveOptions,
    discs: Vec<Disc>,
}

impl<'h> AlbumBuilder<'h> {
    fn new(scope: &'h Path, hints: &'h mut dyn HintSource, options: &'h ResolveOptions) -> Self {
        Self {
            scope,
            hints,
            options,
            discs: Vec::new(),
        }
    }

    fn next_number(&self) -> u32 {
        self.discs.len() as u32 + 1
    }

    fn ask(&mut self, key: &str, prompt: &str, choices: &[String]) -> Result<String> {
        let answer = self.hints.get(self.scope, key, prompt, choices)?;
        Ok(answer.trim().to_string())
    }

    /// Disc cut from one audio file by a cue sheet.
    fn merged_disc(
        &mut self,
        audio: PathBuf,
        sheet: CueSheet,
        embedded: bool,
        cue: Option<PathBuf>,
    ) -> Result<()> {
        let number = self.next_number();
        if sheet.tracks.is_empty() {
            return Err(StructuralError::EmptyCue { audio }.into());
        }

        let artist = match sheet
            .header
            .artist
            .clone()
            .or_else(|| sheet.tracks[0].artist.clone())
        {
            Some(artist) => artist,
            None => self.ask(
                hints::KEY_ARTIST,
                &format!("Artist of disc {number} ({})?", audio.display()),
                &[],
            )?,
        };
        let album = match sheet.header.album.clone() {
            Some(album) => album,
            None => self.ask(
                hints::KEY_ALBUM,
                &format!("Album name of disc {number} ({})?", audio.display()),
                &[],
            )?,
        };

        let mut tracks = Vec::with_capacity(sheet.tracks.len());
        for track in sheet.tracks {
            let title = track.title.ok_or(StructuralError::IncompleteTrack {
                disc: number,
                track: track.number,
                field: "title",
            })?;
            tracks.push(Track {
                number: track.number,
                title,
                artist: track.artist.unwrap_or_else(|| artist.clone()),
                album: track.album.unwrap_or_else(|| album.clone()),
                genre: track.genre,
                date: track.date,
                span: TrackSpan::Clip {
                    start: track.start,
                    duration: track.duration,
                },
            });
        }

        tracing::debug!("Disc {}: {} tracks cut from {:?}", number, tracks.len(), audio);
        self.discs.push(Disc {
            number,
            album: path_safe(&album),
            artist: path_safe(&artist),
            source: DiscSource::Merged {
                audio,
                embedded,
                cue,
            },
            tracks,
        });
        Ok(())
    }

    /// Disc made of one file per track.
    fn split_disc(&mut self, mut files: Vec<&RawFile>) -> Result<()> {
        let number = self.next_number();
        files.sort_by_key(|f| f.track_number());
        let dir = files
            .first()
            .map(|f| f.dirname.display().to_string())
            .unwrap_or_default();

        let albums = distinct(files.iter().map(|f| f.tag("album")));
        let album = match albums.len() {
            1 => albums[0].clone(),
            0 => self.ask(
                hints::KEY_ALBUM,
                &format!("Album name of disc {number} ({dir})?"),
                &[],
            )?,
            _ => self.ask(
                hints::KEY_ALBUM,
                &format!("Tracks of disc {number} ({dir}) disagree on the album name. Which one?"),
                &albums,
            )?,
        };

        let album_artists = distinct(files.iter().map(|f| f.tag("albumartist")));
        let artists = distinct(files.iter().map(|f| f.tag("artist")));
        let artist = if album_artists.len() == 1 {
            album_artists[0].clone()
        } else {
            match artists.len() {
                1 => artists[0].clone(),
                0 => self.ask(
                    hints::KEY_ARTIST,
                    &format!("Artist of disc {number} ({dir})?"),
                    &[],
                )?,
                _ => self.options.various_artists.clone(),
            }
        };

        let mut tracks = Vec::with_capacity(files.len());
        for file in &files {
            tracks.push(Track {
                number: file.track_number().unwrap_or_default(),
                title: file
                    .tag("title")
                    .map(str::to_string)
                    .unwrap_or_else(|| file.stem().to_string()),
                artist: file
                    .tag("artist")
                    .map(str::to_string)
                    .unwrap_or_else(|| artist.clone()),
                album: album.clone(),
                genre: file.tag("genre").map(str::to_string),
                date: file.tag("date").map(str::to_string),
                span: TrackSpan::File {
                    path: file.path.clone(),
                    ext: file.ext.clone(),
                },
            });
        }

        tracing::debug!("Disc {}: {} split tracks in {}", number, tracks.len(), dir);
        self.discs.push(Disc {
            number,
            album: path_safe(&album),
            artist: path_safe(&artist),
            source: DiscSource::Split {
                files: files.iter().map(|f| f.path.clone()).collect(),
            },
            tracks,
        });
        Ok(())
    }

    /// Settle the album name and artist across discs.
    fn finish(mut self) -> Result<Album> {
        let normalized: Vec<String> = self
            .discs
            .iter()
            .map(|d| {
                let name = normalize_album_name(&d.album);
                if name.is_empty() { d.album.clone() } else { name }
            })
            .collect();
        let names = distinct(normalized.iter().map(|n| Some(n.as_str())));

        let name = match names.len() {
            0 => String::new(),
            1 => names[0].clone(),
            _ => {
                let mut choices = names.clone();
                let prefix = common_prefix(&names);
                if !prefix.is_empty() && !choices.contains(&prefix) {
                    choices.push(prefix);
                }
                self.ask(
                    hints::KEY_ALBUM_NAME,
                    "Discs disagree on the album name. Which one?",
                    &choices,
                )?
            }
        };

        let artists: Vec<&str> = self.discs.iter().map(|d| d.artist.as_str()).collect();
        let artist = most_frequent(&artists).unwrap_or_default().to_string();

        Ok(Album {
            name: path_safe(&name),
            artist,
            discs: self.discs,
            cover: None,
            booklets: Vec::new(),
            logs: Vec::new(),
            videos: Vec::new(),
        })
    }
}

/// Most frequent value; ties go to the one seen first.
fn most_frequent<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for value in values {
        let count = values.iter().filter(|v| *v == value).count();
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::models::Timestamp;
    use crate::error::Error;
    use crate::hints::{JsonHintStore, NonInteractive};
    use crate::test_utils::{
        FLAC_SIGNATURE, JPEG_SIGNATURE, MP3_SIGNATURE, ScriptedPrompter, TEXT_SIGNATURE,
        embedded_cue_sheet, tag_map,
    };
    use tempfile::tempdir;

    fn audio(dir: &Path, name: &str, tags: &[(&str, &str)]) -> RawFile {
        RawFile::new(dir.join(name), EntryKind::File, FLAC_SIGNATURE, Some(tag_map(tags)))
    }

    fn plain(dir: &Path, name: &str, signature: &str) -> RawFile {
        RawFile::new(dir.join(name), EntryKind::File, signature, None)
    }

    fn resolve_quiet(files: &[RawFile], scope: &Path) -> Result<Album> {
        let mut hints = JsonHintStore::new(NonInteractive);
        resolve(files, scope, &mut hints, &ResolveOptions::default())
    }

    #[test]
    fn test_two_split_files_make_one_disc() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "02.flac", &[("track", "2"), ("title", "Two"), ("artist", "A"), ("album", "X")]),
            audio(d, "01.flac", &[("track", "1"), ("title", "One"), ("artist", "A"), ("album", "X")]),
            plain(d, "cover.jpg", JPEG_SIGNATURE),
        ];

        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.name, "X");
        assert_eq!(album.artist, "A");
        assert_eq!(album.discs.len(), 1);
        let disc = &album.discs[0];
        assert!(disc.is_split());
        assert_eq!(disc.number, 1);
        let titles: Vec<_> = disc.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two"]);
        assert!(album.cover.is_some());
    }

    #[test]
    fn test_embedded_cue_gives_one_track_per_entry() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let sheet = embedded_cue_sheet("Artist", "Album", "album.flac", 12);
        let files = vec![audio(d, "album.flac", &[("cuesheet", sheet.as_str())])];

        let album = resolve_quiet(&files, d).unwrap();
        let disc = &album.discs[0];
        assert!(disc.cue_embedded());
        assert_eq!(disc.tracks.len(), 12);
        for track in &disc.tracks[..11] {
            assert!(matches!(track.span, TrackSpan::Clip { duration: Some(_), .. }));
        }
        assert!(matches!(
            disc.tracks[11].span,
            TrackSpan::Clip { duration: None, .. }
        ));
        assert_eq!(disc.tracks[0].artist, "Artist");
    }

    #[test]
    fn test_sidecar_cue_with_missing_reference_binds_sole_audio() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let cue_text = embedded_cue_sheet("Artist", "Album", "album.wav", 3);
        std::fs::write(d.join("album.cue"), &cue_text).unwrap();

        let files = vec![
            audio(d, "album.flac", &[]),
            plain(d, "album.cue", TEXT_SIGNATURE),
            plain(d, "album.log", TEXT_SIGNATURE),
        ];

        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.discs.len(), 1);
        assert_eq!(album.discs[0].audio_file(), Some(&d.join("album.flac")));
        assert_eq!(album.discs[0].tracks.len(), 3);
        // the cue is listed with the logs
        assert_eq!(album.logs.len(), 2);
    }

    #[test]
    fn test_second_cue_for_same_audio_is_skipped() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        std::fs::write(d.join("a.cue"), embedded_cue_sheet("Artist", "Album", "album.flac", 3)).unwrap();
        std::fs::write(d.join("b.cue"), embedded_cue_sheet("Artist", "Album", "album.flac", 5)).unwrap();

        let files = vec![
            audio(d, "album.flac", &[]),
            plain(d, "a.cue", TEXT_SIGNATURE),
            plain(d, "b.cue", TEXT_SIGNATURE),
        ];

        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.discs.len(), 1);
        assert_eq!(album.discs[0].tracks.len(), 3);
        assert!(matches!(
            &album.discs[0].source,
            DiscSource::Merged { cue: Some(cue), embedded: false, .. } if *cue == d.join("a.cue")
        ));
    }

    #[test]
    fn test_cue_reference_with_backslashes() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        std::fs::write(d.join("album.cue"), embedded_cue_sheet("A", "B", "CD2\\b.flac", 2)).unwrap();

        let files = vec![
            RawFile::new(d.join("CD1"), EntryKind::Dir, "", None),
            audio(&d.join("CD1"), "a.flac", &[]),
            RawFile::new(d.join("CD2"), EntryKind::Dir, "", None),
            audio(&d.join("CD2"), "b.flac", &[]),
            plain(d, "album.cue", TEXT_SIGNATURE),
        ];

        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.discs.len(), 1);
        assert_eq!(album.discs[0].audio_file(), Some(&d.join("CD2/b.flac")));
    }

    #[test]
    fn test_ambiguous_cue_binding() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        std::fs::write(d.join("album.cue"), embedded_cue_sheet("A", "B", "gone.wav", 2)).unwrap();
        let files = vec![
            audio(d, "a.flac", &[]),
            audio(d, "b.flac", &[]),
            plain(d, "album.cue", TEXT_SIGNATURE),
        ];

        let err = resolve_quiet(&files, d).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::AmbiguousCueAudio { ref candidates, .. }) if candidates.len() == 2
        ));
    }

    #[test]
    fn test_unknown_file_is_structural_error() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "01.flac", &[("track", "1")]),
            plain(d, "setup.exe", "PE32 executable"),
        ];

        let err = resolve_quiet(&files, d).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::UnknownFile { ref signature, .. }) if signature == "PE32 executable"
        ));
    }

    #[test]
    fn test_no_audio() {
        let dir = tempdir().unwrap();
        let files = vec![plain(dir.path(), "cover.jpg", JPEG_SIGNATURE)];
        assert!(matches!(
            resolve_quiet(&files, dir.path()),
            Err(Error::Structural(StructuralError::NoAudio))
        ));
    }

    #[test]
    fn test_mixed_embedded_cue_rejected() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let sheet = embedded_cue_sheet("A", "B", "a.flac", 2);
        let files = vec![
            audio(d, "a.flac", &[("cuesheet", sheet.as_str())]),
            audio(d, "b.flac", &[("track", "1")]),
        ];
        assert!(matches!(
            resolve_quiet(&files, d),
            Err(Error::Structural(StructuralError::MixedEmbeddedCue { with: 1, without: 1 }))
        ));
    }

    #[test]
    fn test_mixed_lossless_and_lossy() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "01.flac", &[("track", "1"), ("title", "T"), ("artist", "A"), ("album", "X")]),
            RawFile::new(
                d.join("01.mp3"),
                EntryKind::File,
                MP3_SIGNATURE,
                Some(tag_map(&[("track", "1")])),
            ),
        ];

        // batch mode cannot confirm
        assert!(matches!(
            resolve_quiet(&files, d),
            Err(Error::HintRequired { ref key, .. }) if key == hints::KEY_MIXED_AUDIO
        ));

        let mut refuse = JsonHintStore::new(ScriptedPrompter::new(["no"]));
        let rejected = resolve(&files, d, &mut refuse, &ResolveOptions::default());
        assert!(matches!(
            rejected,
            Err(Error::Structural(StructuralError::MixedAudioRejected))
        ));

        let other = tempdir().unwrap();
        let files: Vec<RawFile> = files
            .iter()
            .map(|f| RawFile::new(other.path().join(&f.basename), f.kind, f.signature.clone(), f.tags.clone()))
            .collect();
        let mut accept = JsonHintStore::new(ScriptedPrompter::new(["yes"]));
        let album = resolve(&files, other.path(), &mut accept, &ResolveOptions::default()).unwrap();
        assert_eq!(album.track_count(), 1);
        assert!(matches!(&album.discs[0].tracks[0].span, TrackSpan::File { ext, .. } if ext == "flac"));
    }

    #[test]
    fn test_missing_track_number() {
        let dir = tempdir().unwrap();
        let files = vec![audio(dir.path(), "song.flac", &[("title", "Song")])];
        assert!(matches!(
            resolve_quiet(&files, dir.path()),
            Err(Error::Structural(StructuralError::MissingTrackNumber { .. }))
        ));
    }

    #[test]
    fn test_discs_divided_by_album_tag() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "1-01.flac", &[("track", "1"), ("artist", "A"), ("album", "Set (Disc 1)")]),
            audio(d, "1-02.flac", &[("track", "2"), ("artist", "A"), ("album", "Set (Disc 1)")]),
            audio(d, "2-01.flac", &[("track", "1"), ("artist", "A"), ("album", "Set (Disc 2)")]),
        ];

        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.discs.len(), 2);
        assert_eq!(album.discs[1].number, 2);
        assert_eq!(album.name, "Set");
        assert_eq!(album.discs[0].album, "Set (Disc 1)");
    }

    #[test]
    fn test_discs_divided_by_directory() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(&d.join("CD1"), "01.flac", &[("track", "1"), ("artist", "A"), ("album", "Set")]),
            audio(&d.join("CD2"), "01.flac", &[("track", "1"), ("artist", "A"), ("album", "Set")]),
        ];

        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.discs.len(), 2);
        assert_eq!(album.name, "Set");
    }

    #[test]
    fn test_cannot_divide_discs() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "a.flac", &[("track", "1"), ("album", "Set")]),
            audio(d, "b.flac", &[("track", "1"), ("album", "Set")]),
        ];
        assert!(matches!(
            resolve_quiet(&files, d),
            Err(Error::Structural(StructuralError::CannotDivideDiscs))
        ));
    }

    #[test]
    fn test_split_disc_with_many_artists_is_various() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "01.flac", &[("track", "1"), ("artist", "A"), ("album", "Mix")]),
            audio(d, "02.flac", &[("track", "2"), ("artist", "B"), ("album", "Mix")]),
        ];
        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.artist, "Various");
        assert_eq!(album.discs[0].tracks[1].artist, "B");
    }

    #[test]
    fn test_album_artist_tag_wins() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "01.flac", &[("track", "1"), ("artist", "A feat. C"), ("albumartist", "A"), ("album", "X")]),
            audio(d, "02.flac", &[("track", "2"), ("artist", "A"), ("albumartist", "A"), ("album", "X")]),
        ];
        assert_eq!(resolve_quiet(&files, d).unwrap().artist, "A");
    }

    #[test]
    fn test_missing_album_name_is_asked() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![audio(d, "01.flac", &[("track", "1"), ("artist", "A")])];

        let mut hints = JsonHintStore::new(ScriptedPrompter::new(["Given Name"]));
        let album = resolve(&files, d, &mut hints, &ResolveOptions::default()).unwrap();
        assert_eq!(album.name, "Given Name");
        assert_eq!(album.discs[0].tracks[0].album, "Given Name");
        // title falls back to the file stem
        assert_eq!(album.discs[0].tracks[0].title, "01");
    }

    #[test]
    fn test_disagreeing_discs_ask_for_album_name() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(&d.join("a"), "01.flac", &[("track", "1"), ("artist", "A"), ("album", "Live - Night 1")]),
            audio(&d.join("b"), "01.flac", &[("track", "1"), ("artist", "A"), ("album", "Live - Night 2")]),
        ];

        let mut hints = JsonHintStore::new(ScriptedPrompter::new(["Live"]));
        let album = resolve(&files, d, &mut hints, &ResolveOptions::default()).unwrap();
        assert_eq!(album.name, "Live");
        // disc-level names are kept as found
        assert_eq!(album.discs[1].album, "Live - Night 2");

        let saved = hints::load(d).unwrap();
        assert_eq!(saved[hints::KEY_ALBUM_NAME], "Live");
    }

    #[test]
    fn test_slash_in_names_is_replaced() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![audio(d, "01.flac", &[("track", "1"), ("artist", "AC/DC"), ("album", "Back/Black")])];
        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.artist, "AC／DC");
        assert_eq!(album.name, "Back／Black");
    }

    #[test]
    fn test_merged_track_without_title() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let sheet = "PERFORMER \"A\"\nTITLE \"B\"\nFILE \"a.flac\" WAVE\n  TRACK 01 AUDIO\n    INDEX 01 00:00:00\n";
        let files = vec![audio(d, "a.flac", &[("cuesheet", sheet)])];
        assert!(matches!(
            resolve_quiet(&files, d),
            Err(Error::Structural(StructuralError::IncompleteTrack { disc: 1, track: 1, field: "title" }))
        ));
    }

    #[test]
    fn test_merged_disc_without_album_uses_hint() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let sheet = "PERFORMER \"A\"\nFILE \"a.flac\" WAVE\n  TRACK 01 AUDIO\n    TITLE \"T\"\n    INDEX 01 00:00:00\n  TRACK 02 AUDIO\n    TITLE \"U\"\n    INDEX 01 01:00:00\n";
        let files = vec![audio(d, "a.flac", &[("cuesheet", sheet)])];

        let mut hints = JsonHintStore::new(ScriptedPrompter::new(["Named"]));
        let album = resolve(&files, d, &mut hints, &ResolveOptions::default()).unwrap();
        assert_eq!(album.name, "Named");
        assert!(album.discs[0].tracks.iter().all(|t| t.album == "Named"));
        assert_eq!(
            album.discs[0].tracks[1].span,
            TrackSpan::Clip {
                start: Timestamp(6000),
                duration: None
            }
        );
    }

    #[test]
    fn test_most_frequent_tie_goes_to_first() {
        assert_eq!(most_frequent(&["b", "a", "a", "b"]), Some("b"));
        assert_eq!(most_frequent(&["b", "a", "a"]), Some("a"));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn test_extra_covers_dropped() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        let files = vec![
            audio(d, "01.flac", &[("track", "1"), ("artist", "A"), ("album", "X")]),
            plain(d, "cover.jpg", JPEG_SIGNATURE),
            plain(d, "folder.jpg", JPEG_SIGNATURE),
            plain(d, "back.jpg", JPEG_SIGNATURE),
        ];
        let album = resolve_quiet(&files, d).unwrap();
        assert_eq!(album.cover.as_ref().map(|c| c.basename.as_str()), Some("cover.jpg"));
        assert_eq!(album.booklets.len(), 1);
    }
}
