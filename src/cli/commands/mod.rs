//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `plan`: export plan for one album, printed or executed
//! - `scan`: batch planning and the library index
//! - `playlist`: m3u lists and regenerated cue sheets
//! - `classify`: file categories of one directory
//! - `hints`: cached hint values
//! - `settings`: effective configuration

mod classify;
mod hints;
mod plan;
mod playlist;
mod scan;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{self, Config};
use crate::hints::{HintSource, JsonHintStore, NonInteractive, TerminalPrompter};
use crate::probe::MagicProber;
use crate::resolver::ResolveOptions;

pub use classify::cmd_classify;
pub use hints::cmd_hints;
pub use plan::cmd_plan;
pub use playlist::cmd_playlist;
pub use scan::{cmd_index, cmd_scan};
pub use settings::cmd_config;

/// Album Detector CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Never prompt; a hint that is not cached fails the album
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Plan the export of one album directory
    Plan {
        /// Album directory
        path: PathBuf,
        /// Library root to export into (default: from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Export audio and cover only
        #[arg(long)]
        audio_only: bool,
        /// Execute the plan instead of printing it
        #[arg(long)]
        doit: bool,
        /// Parallel copy/clip jobs (0 = one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Print export plans for every album directory below a root
    Scan {
        /// Directory containing album directories
        root: PathBuf,
        /// Library root to export into (default: from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Export audio and cover only
        #[arg(long)]
        audio_only: bool,
    },
    /// Print m3u playlists or regenerated cue sheets for one album
    Playlist {
        /// Album directory
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "m3u")]
        format: PlaylistFormat,
    },
    /// Show the category of every file in a directory
    Classify {
        /// Album directory
        path: PathBuf,
    },
    /// Build a JSON index of every album below a root
    Index {
        /// Directory containing album directories
        root: PathBuf,
        /// Group albums by artist
        #[arg(long)]
        by_artist: bool,
        /// Write the index to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or erase cached hints of an album directory
    Hints {
        /// Album directory
        path: PathBuf,
        /// Hint key to erase
        #[arg(long)]
        erase: Option<String>,
    },
    /// Print the effective configuration
    Config {
        /// Save it to the config file
        #[arg(long)]
        write: bool,
    },
}

/// Playlist output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlaylistFormat {
    M3u,
    Cue,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let ctx = Context {
        config: config::load(),
        non_interactive: cli.non_interactive,
    };

    match &cli.command {
        Commands::Plan {
            path,
            output_dir,
            audio_only,
            doit,
            jobs,
        } => cmd_plan(&ctx, path, output_dir.as_ref(), *audio_only, *doit, *jobs),
        Commands::Scan {
            root,
            output_dir,
            audio_only,
        } => cmd_scan(&ctx, root, output_dir.as_ref(), *audio_only),
        Commands::Playlist { path, format } => cmd_playlist(&ctx, path, *format),
        Commands::Classify { path } => cmd_classify(&ctx, path),
        Commands::Index {
            root,
            by_artist,
            output,
        } => cmd_index(&ctx, root, *by_artist, output.as_ref()),
        Commands::Hints { path, erase } => cmd_hints(&ctx, path, erase.as_deref()),
        Commands::Config { write } => cmd_config(&ctx, *write),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Configuration and global flags, shared by all commands.
pub struct Context {
    pub config: Config,
    pub non_interactive: bool,
}

impl Context {
    pub fn prober(&self) -> MagicProber {
        MagicProber::new(&self.config.tools.file_command)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::from(&self.config)
    }

    /// Hint store for this run; `batch` forces non-interactive mode.
    pub fn hint_store(&self, batch: bool) -> Box<dyn HintSource> {
        if batch || self.non_interactive {
            Box::new(JsonHintStore::new(NonInteractive))
        } else {
            Box::new(JsonHintStore::new(TerminalPrompter))
        }
    }

    pub fn output_root(&self, flag: Option<&PathBuf>) -> PathBuf {
        flag.cloned()
            .unwrap_or_else(|| self.config.output.dir.clone())
    }
}

/// Set a flag on Ctrl-C; exit on the second one.
///
/// The signal is awaited on a small runtime of its own thread, so the batch
/// loop stays synchronous and checks the flag between files.
pub(crate) fn watch_interrupt() -> anyhow::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let watcher = Arc::clone(&flag);
    std::thread::spawn(move || {
        rt.block_on(async {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::warn!("Interrupt received, stopping the batch (Ctrl-C again to quit now)");
            watcher.store(true, Ordering::SeqCst);

            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        })
    });
    Ok(flag)
}
