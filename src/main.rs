//! Album Detector - turns ripped album directories into a tidy library.
//!
//! Each album directory is probed, classified and resolved into discs and
//! tracks; the result is an export plan (copies and clip extractions) that
//! can be printed as shell commands or executed directly.

pub mod classify;
pub mod cli;
pub mod config;
pub mod cue;
pub mod error;
pub mod export;
pub mod hints;
pub mod library;
pub mod metadata;
pub mod model;
pub mod probe;
pub mod resolver;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for plans, playlists and indexes
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("album_detector=info".parse()?))
        .init();

    cli::run_command(&args)
}
