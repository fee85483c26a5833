mod execute;
mod output;
mod output_tests;

use clap::Args;

/// List the databases named in the connections file
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlgate databases                          # Databases from ./connections(.local).json
  sqlgate databases --config-dir conf        # Search conf/ instead
  sqlgate databases -o json                  # Machine-readable listing")]
pub struct DatabasesCmd {}
