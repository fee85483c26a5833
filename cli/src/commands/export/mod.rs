mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Run a read-only query and write the rows to a CSV or XLSX file
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlgate export -d orders -s 'SELECT * FROM customers'                 # query_results.csv
  sqlgate export -d orders -s 'SELECT * FROM customers' -f xlsx          # query_results.xlsx
  sqlgate export -d orders -s 'SELECT * FROM customers' --out /tmp/c.csv")]
pub struct ExportCmd {
    /// Name of the database in the connections file
    #[arg(short, long)]
    pub db: String,

    /// SQL statement to run
    #[arg(short, long)]
    pub sql: String,

    /// File format: csv or xlsx [default: csv]
    #[arg(short = 'f', long)]
    pub file_format: Option<String>,

    /// Where to write the file [default: query_results.<format> in the current directory]
    #[arg(long)]
    pub out: Option<PathBuf>,
}
