use std::fmt;

/// Position inside an audio file, in hundredths of a second.
///
/// Cue frames (1/75 s) are stored as hundredths without conversion, so
/// `INDEX 01 03:20:50` becomes 20050 and prints back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u32);

impl Timestamp {
    /// `None` when seconds or frames are out of range, or the offset does
    /// not fit.
    pub fn from_msf(minutes: u32, seconds: u32, frames: u32) -> Option<Self> {
        if seconds >= 60 || frames >= 75 {
            return None;
        }
        minutes
            .checked_mul(60)
            .and_then(|s| s.checked_add(seconds))
            .and_then(|s| s.checked_mul(100))
            .and_then(|cs| cs.checked_add(frames))
            .map(Self)
    }

    pub fn centiseconds(self) -> u32 {
        self.0
    }

    /// `HH:MM:SS.cc`, the form clip exporters take for seek offsets.
    pub fn to_hms(self) -> String {
        let cs = self.0;
        format!(
            "{:02}:{:02}:{:02}.{:02}",
            cs / 360_000,
            cs / 6_000 % 60,
            cs / 100 % 60,
            cs % 100
        )
    }

    pub fn checked_sub(self, earlier: Timestamp) -> Option<Timestamp> {
        self.0.checked_sub(earlier.0).map(Timestamp)
    }
}

/// `MM:SS:FF`, as written in cue sheets.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cs = self.0;
        write!(f, "{:02}:{:02}:{:02}", cs / 100 / 60, cs / 100 % 60, cs % 100)
    }
}

/// Disc-wide fields of a cue sheet. Every field is optional; the parser never
/// guesses a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueHeader {
    /// `PERFORMER`
    pub artist: Option<String>,
    /// `TITLE`
    pub album: Option<String>,
    /// `FILE`, as written (relative to the cue)
    pub file: Option<String>,
    /// `REM GENRE`
    pub genre: Option<String>,
    /// `REM DATE`
    pub date: Option<String>,
}

/// One `TRACK` entry. Header fields are copied in when the `TRACK` line is
/// read and overridden by the track's own `TITLE`/`PERFORMER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueTrack {
    pub number: u32,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub file: Option<String>,
    pub start: Timestamp,
    /// `None` for the last track: play to the end of the file
    pub duration: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueSheet {
    pub header: CueHeader,
    pub tracks: Vec<CueTrack>,
}

impl CueSheet {
    /// Serialize in the layout common cue readers accept.
    pub fn to_cue_text(&self) -> String {
        let mut out = format!(
            "PERFORMER \"{}\"\nTITLE \"{}\"\nFILE \"{}\" WAVE",
            self.header.artist.as_deref().unwrap_or_default(),
            self.header.album.as_deref().unwrap_or_default(),
            self.header.file.as_deref().unwrap_or_default(),
        );
        for track in &self.tracks {
            out.push_str(&format!(
                "\n  TRACK {:02} AUDIO\n    TITLE \"{}\"\n    PERFORMER \"{}\"\n    INDEX 01 {}",
                track.number,
                track.title.as_deref().unwrap_or_default(),
                track.artist.as_deref().unwrap_or_default(),
                track.start,
            ));
        }
        out
    }
}
