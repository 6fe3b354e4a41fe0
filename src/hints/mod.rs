//! Per-directory hint cache.
//!
//! Values the pipeline cannot infer (a cue sheet's encoding, a missing album
//! name, permission to mix lossless and lossy files) are asked once and kept
//! in `album-hint.json` inside the album directory. The file is re-read on
//! every lookup and rewritten after every answer; there is no locking, so two
//! runs must not work on the same directory at once.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the hint file kept in each album directory.
pub const HINT_FILE_NAME: &str = "album-hint.json";

/// Confirmation to keep going when lossless and lossy audio are mixed.
pub const KEY_MIXED_AUDIO: &str = "mixed_audio";
/// Album name for a disc that has none.
pub const KEY_ALBUM: &str = "album";
/// Artist for a disc that has none.
pub const KEY_ARTIST: &str = "artist";
/// Album name when discs disagree.
pub const KEY_ALBUM_NAME: &str = "album_name";

/// Hint key for the encoding of one cue file.
pub fn encoding_key(cue_basename: &str) -> String {
    format!("encoding:{cue_basename}")
}

/// Source of hint values.
pub trait HintSource {
    /// Cached value, or ask and cache the answer.
    fn get(&mut self, scope: &Path, key: &str, prompt: &str, choices: &[String]) -> Result<String>;

    /// Whether a value is cached.
    fn has(&self, scope: &Path, key: &str) -> Result<bool>;

    /// Drop a cached value. Returns whether there was one.
    fn erase(&mut self, scope: &Path, key: &str) -> Result<bool>;
}

/// Asks the user for a value on a cache miss.
pub trait Prompter {
    fn ask(&mut self, scope: &Path, key: &str, prompt: &str, choices: &[String]) -> Result<String>;
}

/// Ask and read a yes/no hint.
pub fn confirm(hints: &mut dyn HintSource, scope: &Path, key: &str, prompt: &str) -> Result<bool> {
    let choices = ["yes".to_string(), "no".to_string()];
    let answer = hints.get(scope, key, prompt, &choices)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "true"
    ))
}

/// Path of the hint file for a scope.
pub fn hint_path(scope: &Path) -> PathBuf {
    scope.join(HINT_FILE_NAME)
}

/// Read all cached hints of a scope. A missing file is an empty cache.
pub fn load(scope: &Path) -> Result<BTreeMap<String, String>> {
    let path = hint_path(scope);
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_json::from_str(&contents).map_err(|e| Error::hint_store(&path, e.to_string()))
}

/// Write all hints of a scope (temp file, then rename).
pub fn save(scope: &Path, hints: &BTreeMap<String, String>) -> Result<()> {
    let path = hint_path(scope);
    let json =
        serde_json::to_string_pretty(hints).map_err(|e| Error::hint_store(&path, e.to_string()))?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, json)?;
    std::fs::rename(&temp_path, &path)?;
    Ok(())
}

/// Hint store persisted as JSON next to the album.
#[derive(Debug)]
pub struct JsonHintStore<P> {
    prompter: P,
}

impl<P: Prompter> JsonHintStore<P> {
    pub fn new(prompter: P) -> Self {
        Self { prompter }
    }

    #[cfg(test)]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }
}

impl<P: Prompter> HintSource for JsonHintStore<P> {
    fn get(&mut self, scope: &Path, key: &str, prompt: &str, choices: &[String]) -> Result<String> {
        let mut hints = load(scope)?;
        if let Some(value) = hints.get(key) {
            tracing::debug!("Using cached hint {}={:?} for {:?}", key, value, scope);
            return Ok(value.clone());
        }

        let answer = self.prompter.ask(scope, key, prompt, choices)?;
        hints.insert(key.to_string(), answer.clone());
        save(scope, &hints)?;
        tracing::info!("Saved hint {}={:?} for {:?}", key, answer, scope);
        Ok(answer)
    }

    fn has(&self, scope: &Path, key: &str) -> Result<bool> {
        Ok(load(scope)?.contains_key(key))
    }

    fn erase(&mut self, scope: &Path, key: &str) -> Result<bool> {
        let mut hints = load(scope)?;
        if hints.remove(key).is_none() {
            return Ok(false);
        }
        if hints.is_empty() {
            std::fs::remove_file(hint_path(scope))?;
        } else {
            save(scope, &hints)?;
        }
        Ok(true)
    }
}

/// Batch mode: every miss is fatal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn ask(&mut self, scope: &Path, key: &str, _prompt: &str, _choices: &[String]) -> Result<String> {
        Err(Error::HintRequired {
            scope: scope.to_path_buf(),
            key: key.to_string(),
        })
    }
}

/// Prompts on stderr and reads the answer from stdin.
///
/// With choices, a number selects that choice; any other text is taken
/// verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, scope: &Path, key: &str, prompt: &str, choices: &[String]) -> Result<String> {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();

        loop {
            writeln!(stderr, "[{}] {}", scope.display(), prompt)?;
            for (i, choice) in choices.iter().enumerate() {
                writeln!(stderr, "  {}) {}", i + 1, choice)?;
            }
            write!(stderr, "{key}> ")?;
            stderr.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Err(Error::HintRequired {
                    scope: scope.to_path_buf(),
                    key: key.to_string(),
                });
            }

            if let Some(answer) = pick(line.trim(), choices) {
                return Ok(answer);
            }
        }
    }
}

/// Turn raw input into an answer. `None` means ask again.
fn pick(input: &str, choices: &[String]) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=choices.len()).contains(&n) => Some(choices[n - 1].clone()),
        _ => Some(input.to_string()),
    }
}
