mod cli;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let default_filter = if args.global.verbose {
        "nyckel=debug"
    } else {
        "nyckel=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli::run(args)
}
