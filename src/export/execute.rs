//! Carrying out an export plan.
//!
//! Directories are created first, in plan order. Copies and clip exports do
//! not depend on each other and run on a rayon pool. Permissions are fixed
//! once everything is in place.

use rayon::prelude::*;
use std::fs;
use std::process::Command;

use super::{ClipSpec, Operation};
use crate::error::{Error, Result, ResultExt};

/// Counts of what an execution did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub directories: usize,
    pub copies: usize,
    pub clips: usize,
}

/// Runs plans on the local machine.
#[derive(Debug, Clone)]
pub struct Executor {
    ffmpeg: String,
    jobs: usize,
}

impl Executor {
    /// `jobs` of 0 uses one worker per CPU.
    pub fn new(ffmpeg: impl Into<String>, jobs: usize) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            jobs,
        }
    }

    /// Execute every operation of a plan.
    ///
    /// All copies and clips are attempted; the first failure is returned
    /// after the rest have finished.
    pub fn run(&self, ops: &[Operation]) -> Result<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();

        for op in ops {
            if let Operation::MakeDirectory(dir) = op {
                fs::create_dir_all(dir)
                    .with_context(format!("Failed to create directory: {:?}", dir))?;
                summary.directories += 1;
            }
        }

        let work: Vec<&Operation> = ops
            .iter()
            .filter(|op| matches!(op, Operation::CopyFile { .. } | Operation::ExportClip(_)))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| Error::export(format!("cannot start worker pool: {e}")))?;

        let results: Vec<Result<()>> =
            pool.install(|| work.par_iter().map(|op| self.run_one(op)).collect());

        let mut first_error = None;
        for (op, result) in work.iter().zip(results) {
            match result {
                Ok(()) => match op {
                    Operation::ExportClip(_) => summary.clips += 1,
                    _ => summary.copies += 1,
                },
                Err(e) => {
                    tracing::error!("Export step for {:?} failed: {}", op.target(), e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        for op in ops {
            if let Operation::SetPermissions { root, mode } = op {
                set_permissions(root, *mode)?;
            }
        }

        tracing::info!(
            "Export finished: {} directories, {} copies, {} clips",
            summary.directories,
            summary.copies,
            summary.clips
        );
        Ok(summary)
    }

    fn run_one(&self, op: &Operation) -> Result<()> {
        match op {
            Operation::CopyFile { src, dst } => {
                tracing::debug!("Copying {:?} -> {:?}", src, dst);
                fs::copy(src, dst).with_context(format!("Failed to copy file to: {:?}", dst))?;
                Ok(())
            }
            Operation::ExportClip(clip) => self.export_clip(clip),
            Operation::MakeDirectory(_) | Operation::SetPermissions { .. } => Ok(()),
        }
    }

    fn export_clip(&self, clip: &ClipSpec) -> Result<()> {
        tracing::debug!("Exporting {:?} from {:?}", clip.dest, clip.source);
        let output = Command::new(&self.ffmpeg)
            .args(clip_args(clip))
            .output()
            .map_err(|e| Error::export(format!("failed to run {}: {e}", self.ffmpeg)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::export(format!(
                "{} exited with {} for {:?}: {}",
                self.ffmpeg,
                output.status,
                clip.dest,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Arguments for the clip exporter, in the order of the rendered command.
pub fn clip_args(clip: &ClipSpec) -> Vec<String> {
    let mut args = vec![
        "-nostdin".to_string(),
        "-i".to_string(),
        clip.source.to_string_lossy().into_owned(),
        "-ss".to_string(),
        clip.start.to_hms(),
    ];
    if let Some(duration) = clip.duration {
        args.push("-t".to_string());
        args.push(duration.to_hms());
    }
    for (key, value) in &clip.metadata {
        args.push("-metadata".to_string());
        args.push(format!("{key}={value}"));
    }
    args.push(clip.dest.to_string_lossy().into_owned());
    args
}

#[cfg(unix)]
fn set_permissions(root: &std::path::Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            fs::set_permissions(entry.path(), fs::Permissions::from_mode(mode))
                .with_context(format!("Failed to set permissions on {:?}", entry.path()))?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_permissions(root: &std::path::Path, _mode: u32) -> Result<()> {
    tracing::debug!("Skipping permission normalization for {:?}", root);
    Ok(())
}
