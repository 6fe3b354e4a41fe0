//! File classification.
//!
//! Maps a probed file to exactly one [`FileCategory`]. Classification only
//! looks at the lowercase extension, the basename and substrings of the magic
//! string, so classifying the same [`RawFile`] twice always gives the same
//! answer. Rules are tried in priority order; the first match wins.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::metadata::{self, TagMap};

/// What a directory entry is, captured at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    EmptyDir,
}

/// A probed directory entry. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: PathBuf,
    pub basename: String,
    pub dirname: PathBuf,
    /// Text after the last `.` of the basename, lowercased
    pub ext: String,
    pub kind: EntryKind,
    pub signature: String,
    pub tags: Option<TagMap>,
}

impl RawFile {
    pub fn new(
        path: impl Into<PathBuf>,
        kind: EntryKind,
        signature: impl Into<String>,
        tags: Option<TagMap>,
    ) -> Self {
        let path = path.into();
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dirname = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let ext = basename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        Self {
            path,
            basename,
            dirname,
            ext,
            kind,
            signature: signature.into(),
            tags,
        }
    }

    /// Look up a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }

    /// Declared track number (`track` tag).
    pub fn track_number(&self) -> Option<u32> {
        metadata::track_number(self.tags.as_ref()?)
    }

    /// Embedded cue sheet text.
    ///
    /// Monkey's Audio and TTA containers cannot carry one, whatever the
    /// prober reports.
    pub fn embedded_cue(&self) -> Option<&str> {
        if is_ape(&self.signature) || is_tta(&self.signature) {
            return None;
        }
        self.tag(metadata::CUESHEET_KEY)
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.basename)
    }
}

/// Semantic category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    NotFile,
    EmptyDir,
    Garbage,
    Log,
    Cue,
    Video,
    AudioLossless,
    AudioLossy,
    Image,
    CoverImage,
    Unknown,
}

impl FileCategory {
    pub fn is_audio(self) -> bool {
        matches!(self, Self::AudioLossless | Self::AudioLossy)
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFile => "not_file",
            Self::EmptyDir => "empty_dir",
            Self::Garbage => "garbage",
            Self::Log => "log",
            Self::Cue => "cue",
            Self::Video => "video",
            Self::AudioLossless => "audio(lossless)",
            Self::AudioLossy => "audio(lossy)",
            Self::Image => "image",
            Self::CoverImage => "image(cover)",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classification profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// `.iso`/`.mds` images count as garbage rather than video
    pub disc_images_as_garbage: bool,
}

/// Basename, extension and signature of a file, borrowed.
///
/// The scanner classifies before it decides whether to read tags, so the
/// rules work on this view rather than on a finished [`RawFile`].
#[derive(Debug, Clone, Copy)]
pub struct FileFacts<'a> {
    pub kind: EntryKind,
    pub basename: &'a str,
    pub ext: &'a str,
    pub signature: &'a str,
}

impl<'a> From<&'a RawFile> for FileFacts<'a> {
    fn from(file: &'a RawFile) -> Self {
        Self {
            kind: file.kind,
            basename: &file.basename,
            ext: &file.ext,
            signature: &file.signature,
        }
    }
}

/// Classify a probed file.
pub fn classify(file: &RawFile, options: ClassifyOptions) -> FileCategory {
    classify_facts(FileFacts::from(file), options)
}

/// Classify from borrowed facts.
pub fn classify_facts(facts: FileFacts<'_>, options: ClassifyOptions) -> FileCategory {
    match facts.kind {
        EntryKind::EmptyDir => return FileCategory::EmptyDir,
        EntryKind::Dir => return FileCategory::NotFile,
        EntryKind::File => {}
    }

    let cue = is_cue(&facts);
    if is_garbage(&facts, options) {
        FileCategory::Garbage
    } else if is_log(&facts) && !cue {
        FileCategory::Log
    } else if is_video(&facts) {
        FileCategory::Video
    } else if cue {
        FileCategory::Cue
    } else if is_lossless(&facts) {
        FileCategory::AudioLossless
    } else if is_lossy(&facts) {
        FileCategory::AudioLossy
    } else if is_image(&facts) {
        if is_cover(&facts) {
            FileCategory::CoverImage
        } else {
            FileCategory::Image
        }
    } else {
        FileCategory::Unknown
    }
}

fn is_garbage(f: &FileFacts<'_>, options: ClassifyOptions) -> bool {
    let (ext, sig, name) = (f.ext, f.signature, f.basename);

    (ext.starts_with("doc") && sig.contains("Microsoft Word"))
        || (ext == "pdf" && sig.contains("PDF"))
        || name.contains("QuickTimeInstall")
        || (ext == "inf" && sig.contains("Autorun"))
        || (ext == "ico" && sig.contains("icon"))
        || sig.contains("HTML document")
        || (ext == "lrc" && sig.contains("text"))
        || (ext == "srr" && sig == "data")
        || (ext == "fpl" && sig == "data")
        || name == "Thumbs.db"
        || matches!(ext, "url" | "m3u" | "m3u8")
        || name == "inf.xml"
        // .DS_Store
        || sig == "Apple Desktop Services Store"
        || sig == "AppleDouble encoded Macintosh file"
        || (options.disc_images_as_garbage && is_disc_image(f))
}

fn is_log(f: &FileFacts<'_>) -> bool {
    let text = f.signature.contains("text");

    (matches!(f.ext, "accurip" | "sfv" | "nfo") && text)
        || matches!(f.ext, "txt" | "log")
        || f.basename == crate::hints::HINT_FILE_NAME
}

fn is_disc_image(f: &FileFacts<'_>) -> bool {
    matches!(f.ext, "mds" | "iso")
}

fn is_video(f: &FileFacts<'_>) -> bool {
    (f.ext == "mpg" && f.signature.contains("MPEG"))
        || (f.ext == "mov" && f.signature.contains("QuickTime"))
        || f.ext == "mkv"
        || is_disc_image(f)
}

fn is_cue(f: &FileFacts<'_>) -> bool {
    f.ext == "cue" && f.signature.contains("text")
}

fn is_ape(signature: &str) -> bool {
    signature.contains("Monkey's Audio")
}

fn is_tta(signature: &str) -> bool {
    signature.contains("True Audio Lossless Audio")
}

fn is_lossless(f: &FileFacts<'_>) -> bool {
    let sig = f.signature;

    sig.contains("FLAC audio")
        || is_ape(sig)
        || is_tta(sig)
        || sig.contains("WAVE audio")
        // TAK has no magic entry
        || (sig == "data" && f.ext == "tak")
}

fn is_lossy(f: &FileFacts<'_>) -> bool {
    let sig = f.signature;

    match f.ext {
        "ogg" => sig.contains("Vorbis audio"),
        // TODO: Apple iTunes m4a may be ALAC; probe the codec before calling it lossy
        "m4a" => sig.contains("MP4") || sig.contains("Apple iTunes"),
        "mp3" => sig.contains("MPEG ADTS, layer III") || sig.contains("Audio file with ID3"),
        "wma" => sig.contains("Microsoft"),
        _ => false,
    }
}

fn is_image(f: &FileFacts<'_>) -> bool {
    let sig = f.signature;

    sig.contains("TIFF image")
        || sig.contains("JPEG 2000")
        || sig.contains("JPEG image")
        || sig.contains("PNG image")
        || (f.ext == "bmp" && (sig == "data" || sig.contains("PC bitmap")))
}

fn is_cover(f: &FileFacts<'_>) -> bool {
    let name = f.basename.to_lowercase();
    name.starts_with("cover") || name.starts_with("folder")
}
