use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
pub mod output;
#[macro_use]
mod test_macros;
use cli::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let service = args.service();
    let output = args.command.run(&service, args.format)?;
    println!("{}", output);
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
