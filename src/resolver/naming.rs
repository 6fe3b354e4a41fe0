//! Album and artist name clean-up.

use once_cell::sync::Lazy;
use regex::Regex;

/// `Disc 1`, `(Disc.2)`, `[DISC 3]`, `（disc1）`, also straight after CJK text.
///
/// The word boundary is ASCII-only: a Unicode `\b` sees no boundary between
/// kana and Latin letters.
static DISC_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\[（(【［]?\s*(?-u:\b)(?i:disc)[\s.]*\d+\s*[)）\]】］]?").unwrap()
});

/// `CD1`, `[CD2]`, `(CD.3)`, `（CD 4）`
static CD_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[（(【［]?\s*(?-u:\b)(?i:cd)[\s.]*\d+\s*[)）\]】］]?").unwrap());

/// Bracketed edition markers that differ between discs of one release.
static EDITION_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\[（(【［]\s*(?:初回(?:生産)?限定盤?|通常盤)\s*[)）\]】］]").unwrap()
});

/// Strip disc qualifiers and edition markers from an album name.
///
/// Runs to a fixed point, so the result is stable under re-normalization.
pub fn normalize_album_name(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_once(name: &str) -> String {
    let name = DISC_QUALIFIER.replace_all(name, " ");
    let name = CD_QUALIFIER.replace_all(&name, " ");
    let name = EDITION_NOISE.replace_all(&name, " ");

    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    trim_separators(&collapsed).to_string()
}

/// Drop separators left dangling once a qualifier is gone (`Album -`).
fn trim_separators(name: &str) -> &str {
    name.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | '~' | '_' | ':' | '～' | '－' | '/' | '／')
    })
    .trim_start()
}

/// Make a name usable as a single path component.
pub fn path_safe(name: &str) -> String {
    name.replace('/', "／")
}

/// Longest common prefix of all names, without trailing separators.
pub fn common_prefix(names: &[String]) -> String {
    let Some(first) = names.first() else {
        return String::new();
    };

    let mut len = first.len();
    for name in &names[1..] {
        len = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0)
            .min(len);
    }
    trim_separators(&first[..len]).to_string()
}
