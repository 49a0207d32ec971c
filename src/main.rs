mod actions;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod report;
mod state;

use actions::EmailAction;
use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::Config;
use logic::AlertEngine;
use state::OccurrenceStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // RUST_LOG wins over -v
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .init();

    if cli.dry_run {
        eprintln!("Weather Alerts - DRY RUN MODE");
    } else {
        println!("Weather Alerts - Starting...");
    }

    let config = Config::load(cli.config.clone())
        .context("Please copy config.example.yaml to config.yaml and configure it.")?;

    if !cli.dry_run {
        println!("Fetching weather forecast...");
    }
    let forecast = datasources::fetch_forecast(&config.weather, &config.location)
        .await
        .context("Failed to fetch weather data")?;
    anyhow::ensure!(!forecast.is_empty(), "Failed to fetch weather data");
    tracing::debug!("Fetched {} forecast day(s)", forecast.len());

    let email = match (&config.email, cli.dry_run) {
        (Some(email), _) => Some(EmailAction::new(email.clone())),
        (None, true) => None,
        (None, false) => anyhow::bail!("Email settings are required to send alerts"),
    };

    tracing::debug!(
        "{} of {} rule(s) enabled",
        config.enabled_rules().count(),
        config.alert_rules.len()
    );

    let mut engine = AlertEngine::new(OccurrenceStore::open(&config.state_file));
    let outcomes = engine.evaluate(&config.alert_rules, &forecast);

    let mut stdout = std::io::stdout();
    let mut triggered = 0;
    for outcome in &outcomes {
        report::report_outcome(&mut stdout, outcome, cli.dry_run)?;
        if !outcome.triggered() {
            continue;
        }

        triggered += 1;
        if cli.dry_run {
            continue;
        }
        if let Some(email) = &email {
            report::dispatch(email, outcome).await;
        }
    }

    let store = engine.finish();
    if !store.is_empty() {
        tracing::debug!("{} first-occurrence record(s) on file", store.len());
    }

    report::report_summary(&mut stdout, triggered, cli.dry_run)?;
    Ok(())
}
