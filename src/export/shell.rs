//! Plans as shell commands, for review or for piping into `sh`.

use std::path::Path;

use super::{ClipSpec, Operation};

/// Render one operation as a shell command line.
pub fn render(op: &Operation, ffmpeg: &str) -> String {
    match op {
        Operation::MakeDirectory(dir) => format!("mkdir -p {}", quote_path(dir)),
        Operation::CopyFile { src, dst } => {
            format!("cp {} {}", quote_path(src), quote_path(dst))
        }
        Operation::ExportClip(clip) => render_clip(clip, ffmpeg),
        Operation::SetPermissions { root, mode } => format!(
            "find {} -type f -exec chmod {:04o} {{}} \\;",
            quote_path(root),
            mode
        ),
    }
}

/// Render a whole plan, one command per line.
pub fn render_all(ops: &[Operation], ffmpeg: &str) -> Vec<String> {
    ops.iter().map(|op| render(op, ffmpeg)).collect()
}

fn render_clip(clip: &ClipSpec, ffmpeg: &str) -> String {
    let mut cmd = format!(
        "{ffmpeg} -i {} -ss {}",
        quote_path(&clip.source),
        clip.start.to_hms()
    );
    if let Some(duration) = clip.duration {
        cmd.push_str(&format!(" -t {}", duration.to_hms()));
    }
    for (key, value) in &clip.metadata {
        cmd.push_str(&format!(" -metadata {key}={}", quote(value)));
    }
    cmd.push(' ');
    cmd.push_str(&quote_path(&clip.dest));
    cmd
}

fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// Double-quote a word, escaping what the shell expands inside double quotes.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
