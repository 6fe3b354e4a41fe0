//! Command-line interface for album-detector.
//!
//! This module provides CLI commands for planning album exports, batch
//! scanning, playlist regeneration and inspecting classification and hints.

mod commands;

pub use commands::{Cli, Commands, run_command};
