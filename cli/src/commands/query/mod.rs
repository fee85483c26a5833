mod cli_tests;
mod execute;
mod execute_tests;
mod output;

use clap::Args;

/// Validate and run a read-only query
///
/// Only single SELECT/WITH statements are accepted. Statements without a
/// LIMIT/TOP/FETCH clause are capped at 100 rows.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlgate query -d orders -s 'SELECT * FROM customers'
  sqlgate query -d warehouse -s 'SELECT TOP 10 * FROM sales'   # Already bounded
  sqlgate query -d local -s 'WITH t AS (SELECT 1 AS x) SELECT x FROM t' -o json")]
pub struct QueryCmd {
    /// Name of the database in the connections file
    #[arg(short, long)]
    pub db: String,

    /// SQL statement to run
    #[arg(short, long)]
    pub sql: String,
}
