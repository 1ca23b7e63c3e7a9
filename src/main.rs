use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use college_course_search::cli::{Cli, Commands};
use college_course_search::config::Config;
use college_course_search::metrics::MetricsRegistry;
use college_course_search::retrieval::SearchEngine;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting college-course-search"
    );

    if let Err(err) = run(cli).await {
        error!(error = %err, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let metrics = if cli.metrics {
        Some(Arc::new(
            MetricsRegistry::new().context("Failed to create metrics registry")?,
        ))
    } else {
        None
    };
    let engine = SearchEngine::from_config(config, metrics.clone())?;

    match &cli.command {
        Commands::Search { query, grouped, .. } => {
            let filters = cli.command.search_filters().unwrap_or_default();
            if *grouped {
                print_json(&engine.search_grouped(query, &filters).await)?;
            } else {
                print_json(&engine.search(query, &filters).await)?;
            }
        }
        Commands::Suggest { query, .. } => {
            let filters = cli.command.suggest_filters().unwrap_or_default();
            print_json(&engine.suggest(query, &filters).await)?;
        }
        Commands::States => print_json(&engine.available_states().await?)?,
        Commands::Streams => print_json(&engine.available_streams().await?)?,
        Commands::College { id } => match engine.college_details(*id).await? {
            Some(details) => print_json(&details)?,
            None => anyhow::bail!("College {id} not found"),
        },
    }

    if let Some(metrics) = metrics {
        eprint!("{}", metrics.render().context("Failed to render metrics")?);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
