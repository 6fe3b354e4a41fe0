//! Content sniffing and tag extraction.
//!
//! The rest of the crate only sees the [`FileProber`] trait: a magic string
//! describing the file content, and for audio files a lowercase tag map.
//! [`MagicProber`] is the production implementation (a `file(1)`-compatible
//! command plus lofty); tests substitute `test_utils::FakeProber`.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use crate::metadata::{self, TagMap};

/// Black-box file prober.
pub trait FileProber {
    /// Raw type signature of a file.
    fn signature(&self, path: &Path) -> Result<String>;

    /// Tag map of an audio file, `None` when the file has no tags or its
    /// format carries none we can read.
    fn tags(&self, path: &Path) -> Result<Option<TagMap>>;
}

/// Prober backed by a `file -b` compatible command and lofty.
#[derive(Debug, Clone)]
pub struct MagicProber {
    file_command: String,
}

impl MagicProber {
    pub fn new(file_command: impl Into<String>) -> Self {
        Self {
            file_command: file_command.into(),
        }
    }
}

impl Default for MagicProber {
    fn default() -> Self {
        Self::new("file")
    }
}

impl FileProber for MagicProber {
    fn signature(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.file_command)
            .arg("-b")
            .arg(path)
            .output()
            .map_err(|e| Error::probe(path, format!("failed to run {}: {e}", self.file_command)))?;

        if !output.status.success() {
            return Err(Error::probe(
                path,
                format!("{} exited with {}", self.file_command, output.status),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn tags(&self, path: &Path) -> Result<Option<TagMap>> {
        metadata::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_command_is_probe_error() {
        let prober = MagicProber::new("definitely-not-a-real-file-command");
        let result = prober.signature(Path::new("/etc/hosts"));
        assert!(matches!(result, Err(Error::Probe { .. })));
    }

    #[test]
    fn test_tak_audio_probes_without_tags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("album.tak");
        std::fs::write(&path, b"tBaK raw audio payload").unwrap();

        let prober = MagicProber::default();
        assert_eq!(prober.tags(&path).unwrap(), None);
    }

    #[test]
    fn test_tags_of_missing_file_is_probe_error() {
        let prober = MagicProber::default();
        let result = prober.tags(Path::new("/nonexistent/album.flac"));
        assert!(matches!(result, Err(Error::Probe { .. })));
    }
}
