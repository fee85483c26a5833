//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use db::{ConnectionRegistry, QueryService};

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run read-only SQL against named databases", long_about = None)]
pub struct Args {
    /// Directory holding connections.local.json / connections.json
    ///
    /// connections.local.json is used when it exists, otherwise connections.json.
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Read this connections file instead of searching --config-dir
    #[arg(long, global = true, conflicts_with = "config_dir")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Registry over the configured connections source.
    pub fn registry(&self) -> ConnectionRegistry {
        match &self.config {
            Some(file) => ConnectionRegistry::from_file(file),
            None => ConnectionRegistry::in_dir(&self.config_dir),
        }
    }

    pub fn service(&self) -> QueryService {
        QueryService::new(Arc::new(self.registry()))
    }
}
