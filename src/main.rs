mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "erlang_indexer=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref(), cli.root.as_deref())?;

    match cli.command {
        Commands::Index => {
            cli::index_project(config, &cli.db)?;
        }
        Commands::Find { filename } => {
            cli::find_file(config, &cli.db, &filename)?;
        }
        Commands::Paths { category } => {
            cli::show_paths(&config, category)?;
        }
        Commands::Stats => {
            cli::show_stats(&config, &cli.db)?;
        }
    }

    Ok(())
}
