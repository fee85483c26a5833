//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `execute` module producing a serializable result
//! - An `output` module implementing table formatting for that result

mod databases;
mod export;
mod query;

pub use databases::DatabasesCmd;
pub use export::ExportCmd;
pub use query::QueryCmd;

use clap::Subcommand;
use db::QueryService;
use std::error::Error;

use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, service: &QueryService) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured databases (name and type only)
    Databases(DatabasesCmd),

    /// Validate and run a read-only query
    Query(QueryCmd),

    /// Run a read-only query and write the results to a CSV or XLSX file
    Export(ExportCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, service: &QueryService, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Databases(cmd) => {
                let result = cmd.execute(service)?;
                Ok(result.format(format))
            }
            Command::Query(cmd) => {
                let result = cmd.execute(service)?;
                Ok(result.format(format))
            }
            Command::Export(cmd) => {
                let result = cmd.execute(service)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().unwrap_or(&String::new())).into())
            }
        }
    }
}
