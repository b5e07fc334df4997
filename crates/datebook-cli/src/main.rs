mod cli;
mod context;
mod handlers;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::CliContext;
use datebook_client::TransferPolicy;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("DATEBOOK_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_env_filter(EnvFilter::new("debug"))
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .init();
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // The grid needs no server
    if let Commands::Grid { month, week_start } = &cli.command {
        return handlers::timeline::handle_grid(*month, *week_start);
    }

    let ctx = CliContext::connect(&cli)?;
    match cli.command {
        Commands::Events(args) => handlers::timeline::handle_events(&ctx, args).await,
        Commands::Backlog { view, sort } => {
            handlers::timeline::handle_backlog(&ctx, view, sort).await
        }
        Commands::Add(args) => handlers::entries::handle_add(&ctx, args).await,
        Commands::Edit(args) => handlers::entries::handle_edit(&ctx, args).await,
        Commands::Delete { id, postponed } => {
            handlers::entries::handle_delete(&ctx, id, postponed).await
        }
        Commands::Copy(args) => {
            handlers::transfer::handle_to_date(&ctx, args.ids, args.to, TransferPolicy::Copy)
                .await
        }
        Commands::Move(args) => {
            handlers::transfer::handle_to_date(&ctx, args.ids, args.to, TransferPolicy::Move)
                .await
        }
        Commands::Postpone { ids, view, policy } => {
            handlers::transfer::handle_postpone(&ctx, ids, view, policy.into()).await
        }
        Commands::Reactivate { ids, to, policy } => {
            handlers::transfer::handle_reactivate(&ctx, ids, to, policy.into()).await
        }
        Commands::Repostpone { ids, view, policy } => {
            handlers::transfer::handle_repostpone(&ctx, ids, view, policy.into()).await
        }
        Commands::AddRange(args) => handlers::entries::handle_add_range(&ctx, args).await,
        Commands::Watch { interval } => handlers::watch::handle(&ctx, interval).await,
        Commands::Grid { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::output_error(&format!("{e:#}"));
    }
    Ok(())
}
