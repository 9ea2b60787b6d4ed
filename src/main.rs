mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ruby_indexer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let configuration = cli::load_configuration(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats { files } => {
            cli::show_stats(configuration, &files, cli.format)?;
        }
        Commands::Lookup { name, files } => {
            cli::lookup(configuration, &files, &name, cli.format)?;
        }
        Commands::Search {
            query,
            fuzzy,
            threshold,
            limit,
            files,
        } => {
            cli::search(configuration, &files, &query, fuzzy, threshold, limit, cli.format)?;
        }
        Commands::Arity { method, count, files } => {
            cli::check_arity(configuration, &files, &method, count, cli.format)?;
        }
    }

    Ok(())
}
