//! Reading cue files of unknown character set.
//!
//! Order of attempts: byte-order mark, strict UTF-8, a confident guess from
//! the detector, then every candidate encoding (the guess plus the guesses for
//! sibling cue files) is tried and kept if the decoded `FILE` line names an
//! audio file that exists. When nothing settles it the hint store is asked.

use encoding_rs::{Encoding, UTF_8};
use std::path::Path;

use crate::cue;
use crate::cue::error::CueError;
use crate::error::Result;
use crate::hints::{self, HintSource};

/// Read a cue file as text, resolving its encoding.
pub fn read_cue_file(path: &Path, scope: &Path, hints: &mut dyn HintSource) -> Result<String> {
    let bytes = std::fs::read(path).map_err(CueError::from)?;

    if let Some((encoding, bom_len)) = Encoding::for_bom(&bytes)
        && let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
    {
        return Ok(text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(&bytes) {
        return Ok(text.to_string());
    }

    let detected = detect(&bytes);
    decode_legacy(path, &bytes, detected, scope, hints)
}

/// Decode bytes that are neither BOM-marked nor UTF-8, given the detector's
/// guess and whether it is sure about it.
fn decode_legacy(
    path: &Path,
    bytes: &[u8],
    (guess, confident): (&'static Encoding, bool),
    scope: &Path,
    hints: &mut dyn HintSource,
) -> Result<String> {
    if confident {
        tracing::debug!("Decoding {:?} as {}", path, guess.name());
        return Ok(decode(guess, bytes));
    }

    let candidates = candidates(path, guess);
    let dir = path.parent().unwrap_or(Path::new("."));
    for encoding in &candidates {
        let text = decode(encoding, bytes);
        if references_existing_file(&text, dir) {
            tracing::info!("Decoding {:?} as {} (referenced file exists)", path, encoding.name());
            return Ok(text);
        }
    }

    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let choices: Vec<String> = candidates.iter().map(|e| e.name().to_string()).collect();
    let label = hints.get(
        scope,
        &hints::encoding_key(&basename),
        &format!("Character encoding of {basename}?"),
        &choices,
    )?;

    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        CueError::UnresolvableEncoding {
            path: path.to_path_buf(),
        }
    })?;
    Ok(decode(encoding, bytes))
}

/// Best guess and whether the detector is sure about it.
fn detect(bytes: &[u8]) -> (&'static Encoding, bool) {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess_assess(None, false)
}

/// The guess for this file followed by the guesses for sibling cue files.
fn candidates(path: &Path, guess: &'static Encoding) -> Vec<&'static Encoding> {
    let mut out = vec![guess];
    let Some(dir) = path.parent() else {
        return out;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return out;
    };

    let mut siblings: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p != path && p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("cue"))
        })
        .collect();
    siblings.sort();

    for sibling in siblings {
        if let Ok(bytes) = std::fs::read(&sibling) {
            let (encoding, _) = detect(&bytes);
            if encoding != UTF_8 && !out.contains(&encoding) {
                out.push(encoding);
            }
        }
    }
    out
}

fn decode(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn references_existing_file(text: &str, dir: &Path) -> bool {
    cue::parse(text)
        .ok()
        .and_then(|sheet| sheet.header.file)
        .is_some_and(|file| cue::referenced_path(dir, &file).is_file())
}
